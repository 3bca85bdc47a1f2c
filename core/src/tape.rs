//! Reel tape construction and stopping geometry.
//!
//! A tape is the fixed sequence of items scrolled past the viewport
//! during a reveal. Every slot except one is cosmetic filler; the slot
//! at `winner_index` holds the actual draw outcome, so the stopping
//! geometry is known before the animation starts.

use crate::{
    catalog::{Item, RarityWeightTable},
    error::{CoreResult, DrawError},
    rng::DrawRng,
    selector,
};

/// Reference tape length.
pub const TAPE_LENGTH: usize = 80;

/// The winner sits this many slots from the end of the tape.
pub const WINNER_SLOT_FROM_END: usize = 5;

#[derive(Debug, Clone)]
pub struct ReelTape {
    items: Vec<Item>,
    winner_index: usize,
}

impl ReelTape {
    /// Build a tape of `length` weighted filler samples with `outcome`
    /// planted at `winner_index`.
    ///
    /// Filler slots may repeat and may duplicate the outcome by chance;
    /// only the `winner_index` slot is guaranteed. Reproducible for a
    /// fixed filler stream.
    pub fn build(
        outcome: &Item,
        filler_catalog: &[Item],
        length: usize,
        winner_index: usize,
        weights: &RarityWeightTable,
        filler_rng: &mut DrawRng,
    ) -> CoreResult<Self> {
        if winner_index >= length {
            return Err(DrawError::WinnerIndexOutOfRange {
                index: winner_index,
                length,
            });
        }

        let mut items = Vec::with_capacity(length);
        for _ in 0..length {
            items.push(selector::select(filler_catalog, weights, filler_rng)?.clone());
        }
        items[winner_index] = outcome.clone();

        Ok(Self {
            items,
            winner_index,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn winner_index(&self) -> usize {
        self.winner_index
    }

    pub fn winner(&self) -> &Item {
        &self.items[self.winner_index]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

/// Offset that horizontally centers the winning slot in the viewport,
/// regardless of container size.
///
/// `jitter` shifts the stop point so repeated draws of the same item do
/// not look pixel-identical; callers draw it from the jitter stream
/// within the configured bound.
pub fn target_offset(
    winner_index: usize,
    item_width: f64,
    viewport_width: f64,
    jitter: f64,
) -> f64 {
    winner_index as f64 * item_width - viewport_width / 2.0 + item_width / 2.0 + jitter
}
