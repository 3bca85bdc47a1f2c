//! Reel tape construction and stopping-geometry tests.

use caseogo_core::{
    catalog::{Item, RarityWeightTable},
    error::DrawError,
    rng::DrawRng,
    tape::{target_offset, ReelTape, TAPE_LENGTH, WINNER_SLOT_FROM_END},
};

fn item(item_id: &str, rarity: &str) -> Item {
    Item {
        item_id: item_id.to_string(),
        name: item_id.to_string(),
        price: 100,
        rarity: rarity.to_string(),
        image_url: None,
        custom_color: None,
    }
}

fn filler() -> Vec<Item> {
    vec![item("c", "common"), item("r", "rare"), item("l", "legendary")]
}

/// Every valid winner index yields a tape of exactly the requested
/// length with the outcome planted at that slot.
#[test]
fn winner_planted_at_every_valid_index() {
    let outcome = item("winner", "legendary");
    let catalog = filler();
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(5, 1);

    for winner_index in 0..TAPE_LENGTH {
        let tape = ReelTape::build(
            &outcome,
            &catalog,
            TAPE_LENGTH,
            winner_index,
            &weights,
            &mut rng,
        )
        .unwrap();
        assert_eq!(tape.len(), TAPE_LENGTH);
        assert_eq!(tape.winner_index(), winner_index);
        assert_eq!(tape.items()[winner_index].item_id, "winner");
        assert_eq!(tape.winner().item_id, "winner");
    }
}

/// The reference geometry puts the winner five slots from the end.
#[test]
fn reference_winner_slot() {
    assert_eq!(TAPE_LENGTH - WINNER_SLOT_FROM_END, 75);
}

/// winner_index == length is one past the end and must be rejected.
#[test]
fn out_of_range_winner_index_is_rejected() {
    let outcome = item("winner", "legendary");
    let catalog = filler();
    let weights = RarityWeightTable::default();
    let mut rng = DrawRng::new(5, 1);

    let result = ReelTape::build(&outcome, &catalog, 80, 80, &weights, &mut rng);
    assert!(matches!(
        result,
        Err(DrawError::WinnerIndexOutOfRange { index: 80, length: 80 })
    ));
}

/// Given a fixed outcome and a fixed filler seed, the tape is
/// reproducible slot for slot.
#[test]
fn tape_is_reproducible_for_fixed_filler_seed() {
    let outcome = item("winner", "epic");
    let catalog = filler();
    let weights = RarityWeightTable::default();

    let mut rng_a = DrawRng::new(99, 1);
    let mut rng_b = DrawRng::new(99, 1);
    let a = ReelTape::build(&outcome, &catalog, 80, 75, &weights, &mut rng_a).unwrap();
    let b = ReelTape::build(&outcome, &catalog, 80, 75, &weights, &mut rng_b).unwrap();

    assert_eq!(a.items(), b.items());
}

/// The reference offset case: itemWidth=200, winnerIndex=75,
/// viewport=1000 → 75*200 − 500 + 100 = 14600.
#[test]
fn reference_target_offset() {
    assert_eq!(target_offset(75, 200.0, 1000.0, 0.0), 14_600.0);
}

/// Jitter shifts the stop point by exactly its own amount.
#[test]
fn jitter_shifts_offset_linearly() {
    let base = target_offset(75, 200.0, 1000.0, 0.0);
    assert_eq!(target_offset(75, 200.0, 1000.0, 40.0), base + 40.0);
    assert_eq!(target_offset(75, 200.0, 1000.0, -40.0), base - 40.0);
}

/// The winning slot's center lands at the viewport center: the offset
/// places slot_left = winner*width − offset, and its center sits at
/// viewport/2 for any viewport width.
#[test]
fn winner_slot_centers_in_any_viewport() {
    for viewport in [640.0, 1000.0, 1920.0] {
        let offset = target_offset(75, 200.0, viewport, 0.0);
        let slot_left = 75.0 * 200.0 - offset;
        let slot_center = slot_left + 100.0;
        assert!((slot_center - viewport / 2.0).abs() < 1e-9);
    }
}
