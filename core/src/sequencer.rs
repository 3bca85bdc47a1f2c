//! The draw transaction sequencer.
//!
//! Step order is fixed: precondition → debit → draw → grant. Debit
//! precedes draw so a user is never granted an item without being
//! charged. The window this opens (debit applied, grant fails) is
//! closed by the grant-retry-then-refund policy below.
//!
//! RULES:
//!   - Exactly one debit and at most one grant per successful call.
//!   - Zero mutations on any early failure.
//!   - Every mutation is mirrored into the draw event log, in order.

use crate::{
    catalog::{Item, RarityWeightTable},
    error::{CoreResult, DrawError},
    event::DrawEvent,
    rng::DrawRng,
    selector,
    store::{DrawEventLog, InventoryStore, ProfileStore},
    types::{GrantId, ProfileId},
};
use uuid::Uuid;

/// Total grant attempts before the debit is refunded.
pub const GRANT_RETRY_LIMIT: u32 = 3;

/// One finalized draw. Immutable once produced; lives for the duration
/// of a single open operation plus its reveal.
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub draw_id: String,
    pub item: Item,
    pub grant_id: GrantId,
}

/// Run the full economic transaction for one case open.
///
/// On `InsufficientFunds` or an empty catalog nothing has been
/// mutated. On `DebitFailed` no draw was performed. On `GrantFailed`
/// the debit has been refunded unless the error says otherwise, in
/// which case the event log holds the trail for manual reconciliation.
#[allow(clippy::too_many_arguments)]
pub fn open_case(
    profile_id: &ProfileId,
    price: i64,
    catalog: &[Item],
    weights: &RarityWeightTable,
    profiles: &dyn ProfileStore,
    inventory: &dyn InventoryStore,
    events: &dyn DrawEventLog,
    outcome_rng: &mut DrawRng,
) -> CoreResult<DrawOutcome> {
    // Both preconditions are checked before any mutation: an empty
    // catalog would otherwise fail the draw step after the debit.
    if catalog.is_empty() {
        return Err(DrawError::EmptyCatalog);
    }
    let balance = profiles.get_balance(profile_id)?;
    if balance < price {
        return Err(DrawError::InsufficientFunds { balance, price });
    }

    let draw_id = Uuid::new_v4().to_string();
    events.append_event(
        profile_id,
        &DrawEvent::DrawStarted {
            draw_id: draw_id.clone(),
            profile_id: profile_id.clone(),
            price,
        },
    )?;

    let balance_after = balance - price;
    if let Err(e) = profiles.set_balance(profile_id, balance_after) {
        log::warn!("draw={draw_id} debit rejected: {e}");
        events.append_event(
            profile_id,
            &DrawEvent::DrawFailed {
                draw_id,
                reason: "debit_rejected".to_string(),
            },
        )?;
        return Err(DrawError::DebitFailed {
            profile_id: profile_id.clone(),
        });
    }
    events.append_event(
        profile_id,
        &DrawEvent::DebitApplied {
            draw_id: draw_id.clone(),
            profile_id: profile_id.clone(),
            amount: price,
            balance_after,
        },
    )?;

    // The outcome is fixed here; grant retries below reuse it rather
    // than redrawing.
    let item = selector::select(catalog, weights, outcome_rng)?.clone();

    let mut attempt = 1u32;
    let grant_id = loop {
        match inventory.grant(profile_id, &item.item_id) {
            Ok(grant_id) => break grant_id,
            Err(e) if attempt < GRANT_RETRY_LIMIT => {
                log::warn!("draw={draw_id} grant attempt {attempt} failed: {e}");
                events.append_event(
                    profile_id,
                    &DrawEvent::GrantRetried {
                        draw_id: draw_id.clone(),
                        item_id: item.item_id.clone(),
                        attempt,
                    },
                )?;
                attempt += 1;
            }
            Err(e) => {
                log::error!("draw={draw_id} grant failed terminally: {e}");
                let refunded = profiles.set_balance(profile_id, balance).is_ok();
                if refunded {
                    events.append_event(
                        profile_id,
                        &DrawEvent::RefundIssued {
                            draw_id: draw_id.clone(),
                            profile_id: profile_id.clone(),
                            amount: price,
                        },
                    )?;
                } else {
                    log::error!(
                        "draw={draw_id} refund also failed; balance and inventory disagree"
                    );
                }
                events.append_event(
                    profile_id,
                    &DrawEvent::DrawFailed {
                        draw_id,
                        reason: "grant_failed".to_string(),
                    },
                )?;
                return Err(DrawError::GrantFailed {
                    item_id: item.item_id.clone(),
                    refunded,
                });
            }
        }
    };

    events.append_event(
        profile_id,
        &DrawEvent::ItemGranted {
            draw_id: draw_id.clone(),
            profile_id: profile_id.clone(),
            item_id: item.item_id.clone(),
            grant_id: grant_id.clone(),
        },
    )?;
    log::debug!(
        "draw={draw_id} granted item={} rarity={} balance={balance_after}",
        item.item_id,
        item.rarity
    );

    Ok(DrawOutcome {
        draw_id,
        item,
        grant_id,
    })
}
