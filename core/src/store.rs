//! SQLite persistence and the external collaborator traits.
//!
//! RULE: Only this module talks to the database.
//! The selector, tape builder, controller and sequencer call trait
//! methods — they never execute SQL directly.

use crate::{
    catalog::Item,
    error::CoreResult,
    event::{event_type_name, DrawEvent, DrawEventRow},
    types::{GrantId, ItemId, ProfileId},
};
use rusqlite::{params, Connection};
use uuid::Uuid;

/// Read-only access to the drawable catalog. May be cached by the
/// caller; the session re-fetches per session, not per draw.
pub trait CatalogProvider {
    fn list_items(&self) -> CoreResult<Vec<Item>>;
}

/// Balance reads and writes for one profile.
///
/// No compare-and-swap is assumed: the sequencer performs a
/// read-then-write, so concurrent draws against the same profile from
/// two devices can lose an update. Serializing draws per profile is
/// the store owner's concern, not the core's.
pub trait ProfileStore {
    fn get_balance(&self, profile_id: &ProfileId) -> CoreResult<i64>;
    fn set_balance(&self, profile_id: &ProfileId, gcoins: i64) -> CoreResult<()>;
}

/// Inventory writes. Each successful grant creates exactly one row.
pub trait InventoryStore {
    fn grant(&self, profile_id: &ProfileId, item_id: &ItemId) -> CoreResult<GrantId>;
}

/// Append-only audit log of draw events.
pub trait DrawEventLog {
    fn append_event(&self, profile_id: &ProfileId, event: &DrawEvent) -> CoreResult<()>;
}

/// One inventory row as read back for display.
#[derive(Debug, Clone)]
pub struct InventoryRow {
    pub grant_id: GrantId,
    pub item_id: ItemId,
    pub acquired_at: String,
}

pub struct CaseStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl CaseStore {
    pub fn open(path: &str) -> CoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new isolated database.
    pub fn reopen(&self) -> CoreResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> CoreResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Profile ────────────────────────────────────────────────

    pub fn insert_profile(
        &self,
        profile_id: &ProfileId,
        username: &str,
        gcoins: i64,
    ) -> CoreResult<()> {
        self.conn.execute(
            "INSERT INTO profile (profile_id, username, gcoins, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                profile_id,
                username,
                gcoins,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn profile_exists(&self, profile_id: &ProfileId) -> CoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM profile WHERE profile_id = ?1",
            params![profile_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ── Catalog ────────────────────────────────────────────────

    pub fn insert_item(&self, item: &Item) -> CoreResult<()> {
        self.conn.execute(
            "INSERT INTO item (item_id, name, price, rarity, image_url, custom_color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.item_id,
                item.name,
                item.price,
                item.rarity,
                item.image_url.as_deref(),
                item.custom_color.as_deref(),
            ],
        )?;
        Ok(())
    }

    pub fn item_count(&self) -> CoreResult<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM item", [], |row| row.get(0))?;
        Ok(count)
    }

    // ── Inventory ──────────────────────────────────────────────

    pub fn inventory_for_profile(&self, profile_id: &ProfileId) -> CoreResult<Vec<InventoryRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT grant_id, item_id, acquired_at
             FROM inventory WHERE profile_id = ?1
             ORDER BY acquired_at ASC, grant_id ASC",
        )?;
        let rows = stmt.query_map(params![profile_id], |row| {
            Ok(InventoryRow {
                grant_id: row.get(0)?,
                item_id: row.get(1)?,
                acquired_at: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn inventory_count(&self, profile_id: &ProfileId) -> CoreResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM inventory WHERE profile_id = ?1",
            params![profile_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn events_for_profile(&self, profile_id: &ProfileId) -> CoreResult<Vec<DrawEventRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, profile_id, event_type, payload, recorded_at
             FROM draw_event WHERE profile_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![profile_id], |row| {
            Ok(DrawEventRow {
                id: Some(row.get(0)?),
                profile_id: row.get(1)?,
                event_type: row.get(2)?,
                payload: row.get(3)?,
                recorded_at: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

impl CatalogProvider for CaseStore {
    fn list_items(&self) -> CoreResult<Vec<Item>> {
        // rowid order = insertion order; the selector's tie-break
        // behavior depends on a stable listing order.
        let mut stmt = self.conn.prepare(
            "SELECT item_id, name, price, rarity, image_url, custom_color
             FROM item ORDER BY rowid ASC",
        )?;
        let items = stmt.query_map([], |row| {
            Ok(Item {
                item_id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
                rarity: row.get(3)?,
                image_url: row.get(4)?,
                custom_color: row.get(5)?,
            })
        })?;
        items.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

impl ProfileStore for CaseStore {
    fn get_balance(&self, profile_id: &ProfileId) -> CoreResult<i64> {
        let gcoins: i64 = self.conn.query_row(
            "SELECT gcoins FROM profile WHERE profile_id = ?1",
            params![profile_id],
            |row| row.get(0),
        )?;
        Ok(gcoins)
    }

    fn set_balance(&self, profile_id: &ProfileId, gcoins: i64) -> CoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE profile SET gcoins = ?1 WHERE profile_id = ?2",
            params![gcoins, profile_id],
        )?;
        if changed != 1 {
            return Err(anyhow::anyhow!("No profile '{profile_id}' to update").into());
        }
        Ok(())
    }
}

impl InventoryStore for CaseStore {
    fn grant(&self, profile_id: &ProfileId, item_id: &ItemId) -> CoreResult<GrantId> {
        let grant_id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO inventory (grant_id, profile_id, item_id, acquired_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                grant_id,
                profile_id,
                item_id,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(grant_id)
    }
}

impl DrawEventLog for CaseStore {
    fn append_event(&self, profile_id: &ProfileId, event: &DrawEvent) -> CoreResult<()> {
        self.conn.execute(
            "INSERT INTO draw_event (profile_id, event_type, payload, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                profile_id,
                event_type_name(event),
                serde_json::to_string(event)?,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
