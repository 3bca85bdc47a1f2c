//! Draw audit events.
//!
//! RULE: every economic mutation the sequencer performs is recorded
//! here, in order. The event log is the reconciliation trail when a
//! draw fails partway through.

use crate::types::{GrantId, ItemId, ProfileId};
use serde::{Deserialize, Serialize};

/// Every event emitted during a draw.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawEvent {
    DrawStarted {
        draw_id: String,
        profile_id: ProfileId,
        price: i64,
    },
    DebitApplied {
        draw_id: String,
        profile_id: ProfileId,
        amount: i64,
        balance_after: i64,
    },
    GrantRetried {
        draw_id: String,
        item_id: ItemId,
        attempt: u32,
    },
    ItemGranted {
        draw_id: String,
        profile_id: ProfileId,
        item_id: ItemId,
        grant_id: GrantId,
    },
    RefundIssued {
        draw_id: String,
        profile_id: ProfileId,
        amount: i64,
    },
    DrawSettled {
        draw_id: String,
        item_id: ItemId,
    },
    DrawFailed {
        draw_id: String,
        reason: String,
    },
}

/// Extract a stable string name from a DrawEvent variant.
/// Used for the event_type column in draw_event.
pub fn event_type_name(event: &DrawEvent) -> &'static str {
    match event {
        DrawEvent::DrawStarted { .. }  => "draw_started",
        DrawEvent::DebitApplied { .. } => "debit_applied",
        DrawEvent::GrantRetried { .. } => "grant_retried",
        DrawEvent::ItemGranted { .. }  => "item_granted",
        DrawEvent::RefundIssued { .. } => "refund_issued",
        DrawEvent::DrawSettled { .. }  => "draw_settled",
        DrawEvent::DrawFailed { .. }   => "draw_failed",
    }
}

/// The event row as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawEventRow {
    pub id: Option<i64>,
    pub profile_id: ProfileId,
    pub event_type: String,
    pub payload: String, // JSON-serialized DrawEvent
    pub recorded_at: String,
}
