//! Weighted draw selection.
//!
//! Linear cumulative-weight sampling over the supplied item order.
//! Catalogs are tens of items, so no cumulative-distribution table is
//! precomputed.

use crate::{
    catalog::{Item, RarityWeightTable},
    error::{CoreResult, DrawError},
    rng::DrawRng,
};

/// Pick one item from `items` with probability proportional to its
/// rarity weight.
///
/// The scan order is the supplied order; floating-point ties resolve to
/// the earlier item. If accumulated rounding exhausts the scan, the
/// last item is returned — a non-empty catalog never fails.
pub fn select<'a>(
    items: &'a [Item],
    weights: &RarityWeightTable,
    rng: &mut DrawRng,
) -> CoreResult<&'a Item> {
    let last = items.last().ok_or(DrawError::EmptyCatalog)?;

    let total: f64 = items.iter().map(|i| weights.weight_of(&i.rarity)).sum();
    let mut roll = rng.next_f64_below(total);

    for item in items {
        let weight = weights.weight_of(&item.rarity);
        if roll < weight {
            return Ok(item);
        }
        roll -= weight;
    }

    Ok(last)
}
