//! Draw transaction sequencer tests: funds preconditions, the
//! grant-retry-then-refund policy, and the audit trail.

use caseogo_core::{
    catalog::{Item, RarityWeightTable},
    error::{CoreResult, DrawError},
    rng::DrawRng,
    sequencer::open_case,
    store::{CaseStore, InventoryStore, ProfileStore},
    types::{GrantId, ItemId, ProfileId},
};
use std::cell::Cell;

fn setup(gcoins: i64) -> (CaseStore, Vec<Item>, ProfileId) {
    let store = CaseStore::in_memory().unwrap();
    store.migrate().unwrap();
    let profile_id = "tester".to_string();
    store.insert_profile(&profile_id, "tester", gcoins).unwrap();
    let catalog = caseogo_core::session::reference_catalog();
    for item in &catalog {
        store.insert_item(item).unwrap();
    }
    (store, catalog, profile_id)
}

/// Inventory double that fails a fixed number of grants, then
/// delegates to the real store.
struct FlakyInventory<'a> {
    inner: &'a CaseStore,
    failures_left: Cell<u32>,
}

impl InventoryStore for FlakyInventory<'_> {
    fn grant(&self, profile_id: &ProfileId, item_id: &ItemId) -> CoreResult<GrantId> {
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(anyhow::anyhow!("transient inventory outage").into());
        }
        self.inner.grant(profile_id, item_id)
    }
}

/// Inventory double that never succeeds.
struct DeadInventory;

impl InventoryStore for DeadInventory {
    fn grant(&self, _profile_id: &ProfileId, _item_id: &ItemId) -> CoreResult<GrantId> {
        Err(anyhow::anyhow!("inventory store down").into())
    }
}

/// Profile double whose writes always fail; reads delegate.
struct FrozenProfiles<'a> {
    inner: &'a CaseStore,
}

impl ProfileStore for FrozenProfiles<'_> {
    fn get_balance(&self, profile_id: &ProfileId) -> CoreResult<i64> {
        self.inner.get_balance(profile_id)
    }
    fn set_balance(&self, _profile_id: &ProfileId, _gcoins: i64) -> CoreResult<()> {
        Err(anyhow::anyhow!("profile store read-only").into())
    }
}

/// balance=100, price=150: rejected before any mutation.
#[test]
fn insufficient_funds_mutates_nothing() {
    let (store, catalog, profile_id) = setup(100);
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(42, 0);

    let result = open_case(
        &profile_id, 150, &catalog, &weights, &store, &store, &store, &mut rng,
    );

    assert!(matches!(
        result,
        Err(DrawError::InsufficientFunds { balance: 100, price: 150 })
    ));
    assert_eq!(store.get_balance(&profile_id).unwrap(), 100);
    assert_eq!(store.inventory_count(&profile_id).unwrap(), 0);
    assert!(store.events_for_profile(&profile_id).unwrap().is_empty());
}

/// balance=150, price=150: success leaves balance at 0 and creates
/// exactly one inventory row for the drawn item.
#[test]
fn exact_funds_settle_to_zero_with_one_grant() {
    let (store, catalog, profile_id) = setup(150);
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(42, 0);

    let outcome = open_case(
        &profile_id, 150, &catalog, &weights, &store, &store, &store, &mut rng,
    )
    .unwrap();

    assert_eq!(store.get_balance(&profile_id).unwrap(), 0);
    let inventory = store.inventory_for_profile(&profile_id).unwrap();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory[0].item_id, outcome.item.item_id);
    assert_eq!(inventory[0].grant_id, outcome.grant_id);
}

/// The happy path writes the audit trail in step order.
#[test]
fn audit_trail_follows_step_order() {
    let (store, catalog, profile_id) = setup(150);
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(42, 0);

    open_case(
        &profile_id, 150, &catalog, &weights, &store, &store, &store, &mut rng,
    )
    .unwrap();

    let kinds: Vec<String> = store
        .events_for_profile(&profile_id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(kinds, ["draw_started", "debit_applied", "item_granted"]);
}

/// An empty catalog is rejected before the debit.
#[test]
fn empty_catalog_rejected_before_debit() {
    let (store, _catalog, profile_id) = setup(150);
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(42, 0);

    let result = open_case(
        &profile_id, 150, &[], &weights, &store, &store, &store, &mut rng,
    );

    assert!(matches!(result, Err(DrawError::EmptyCatalog)));
    assert_eq!(store.get_balance(&profile_id).unwrap(), 150);
}

/// A rejected debit surfaces as DebitFailed with no draw performed.
#[test]
fn rejected_debit_performs_no_draw() {
    let (store, catalog, profile_id) = setup(150);
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(42, 0);
    let profiles = FrozenProfiles { inner: &store };

    let result = open_case(
        &profile_id, 150, &catalog, &weights, &profiles, &store, &store, &mut rng,
    );

    assert!(matches!(result, Err(DrawError::DebitFailed { .. })));
    assert_eq!(store.get_balance(&profile_id).unwrap(), 150);
    assert_eq!(store.inventory_count(&profile_id).unwrap(), 0);
}

/// Transient grant failures are retried with the already-determined
/// outcome: one debit, one grant, two retry events.
#[test]
fn transient_grant_failure_is_retried() {
    let (store, catalog, profile_id) = setup(150);
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(42, 0);
    let inventory = FlakyInventory {
        inner: &store,
        failures_left: Cell::new(2),
    };

    let outcome = open_case(
        &profile_id, 150, &catalog, &weights, &store, &inventory, &store, &mut rng,
    )
    .unwrap();

    assert_eq!(store.get_balance(&profile_id).unwrap(), 0);
    assert_eq!(store.inventory_count(&profile_id).unwrap(), 1);
    assert!(!outcome.grant_id.is_empty());

    let retries = store
        .events_for_profile(&profile_id)
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type == "grant_retried")
        .count();
    assert_eq!(retries, 2);
}

/// Terminal grant failure refunds the debit: currency is never spent
/// on an item that was not recorded.
#[test]
fn terminal_grant_failure_refunds_the_debit() {
    let (store, catalog, profile_id) = setup(150);
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(42, 0);

    let result = open_case(
        &profile_id, 150, &catalog, &weights, &store, &DeadInventory, &store, &mut rng,
    );

    assert!(matches!(
        result,
        Err(DrawError::GrantFailed { refunded: true, .. })
    ));
    assert_eq!(store.get_balance(&profile_id).unwrap(), 150);
    assert_eq!(store.inventory_count(&profile_id).unwrap(), 0);

    let kinds: Vec<String> = store
        .events_for_profile(&profile_id)
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        kinds,
        [
            "draw_started",
            "debit_applied",
            "grant_retried",
            "grant_retried",
            "refund_issued",
            "draw_failed"
        ]
    );
}
