//! Determinism tests — two sessions with the same master seed must
//! draw the same items in the same order.

use caseogo_core::session::CaseSession;

fn drawn_items(seed: u64, opens: usize) -> Vec<String> {
    let mut session = CaseSession::build_test("p1", 150 * opens as i64, seed).unwrap();
    let mut items = Vec::with_capacity(opens);
    for _ in 0..opens {
        session.open().unwrap();
        session.launch(1000.0).unwrap();
        let outcome = session.advance(7_500).unwrap().expect("settled");
        items.push(outcome.item.item_id.clone());
        session.acknowledge();
    }
    items
}

#[test]
fn same_seed_draws_the_same_sequence() {
    let a = drawn_items(7, 8);
    let b = drawn_items(7, 8);
    assert_eq!(a, b);
}

/// The filler and jitter streams never move the outcome stream:
/// consuming extra filler and jitter between draws does not change
/// which items win.
#[test]
fn filler_and_jitter_streams_do_not_shift_outcomes() {
    let baseline = controller_run(21, 6, false);
    let perturbed = controller_run(21, 6, true);
    assert_eq!(baseline, perturbed);
}

fn controller_run(seed: u64, opens: usize, perturb: bool) -> Vec<String> {
    use caseogo_core::{
        config::CaseConfig,
        reveal::RevealController,
        rng::{RngBank, RngStream},
        session::reference_catalog,
        store::CaseStore,
    };

    let store = CaseStore::in_memory().unwrap();
    store.migrate().unwrap();
    let profile_id = "p1".to_string();
    store
        .insert_profile(&profile_id, "p1", 150 * opens as i64)
        .unwrap();
    let catalog = reference_catalog();
    for item in &catalog {
        store.insert_item(item).unwrap();
    }

    let config = CaseConfig::default_test();
    let weights = config.weight_table();
    let bank = RngBank::new(seed);
    let mut outcome_rng = bank.for_stream(RngStream::Outcome);
    let mut filler_rng = bank.for_stream(RngStream::Filler);
    let mut jitter_rng = bank.for_stream(RngStream::Jitter);
    let mut controller = RevealController::new(config.clone());

    let mut winners = Vec::with_capacity(opens);
    for _ in 0..opens {
        if perturb {
            // Unrelated consumption on the cosmetic streams.
            for _ in 0..17 {
                filler_rng.next_f64();
                jitter_rng.next_f64();
            }
        }
        controller
            .open(
                &profile_id,
                &catalog,
                &weights,
                &store,
                &store,
                &store,
                &mut outcome_rng,
                &mut filler_rng,
            )
            .unwrap();
        controller.launch(1000.0, 0, &mut jitter_rng).unwrap();
        let outcome = controller.on_clock(config.reveal_duration_ms).unwrap();
        winners.push(outcome.item.item_id.clone());
        controller.acknowledge();
    }
    winners
}
