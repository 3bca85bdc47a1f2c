//! Catalog types: drawable items and the rarity weight table.

use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One drawable catalog entry. Owned by the catalog store; the draw
/// engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub name: String,
    /// Positive price in gcoins.
    pub price: i64,
    /// Rarity label, used only for weight lookup. Free-form: custom
    /// labels are allowed and weigh as the fallback tier.
    pub rarity: String,
    /// Opaque asset reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Visual identity uncoupled from rarity.
    #[serde(default)]
    pub custom_color: Option<String>,
}

/// Maps rarity labels to sampling weights.
///
/// Labels missing from the table weigh `fallback`, the common-tier
/// weight, so an unrecognized custom rarity draws like a common item
/// rather than never or always.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityWeightTable {
    weights: HashMap<String, f64>,
    fallback: f64,
}

impl RarityWeightTable {
    pub fn new(weights: HashMap<String, f64>, fallback: f64) -> Self {
        Self { weights, fallback }
    }

    pub fn weight_of(&self, rarity: &str) -> f64 {
        self.weights.get(rarity).copied().unwrap_or(self.fallback)
    }
}

impl Default for RarityWeightTable {
    /// The reference table: common 80, rare 15, epic 4, legendary 1.
    fn default() -> Self {
        Self {
            weights: [
                ("common".to_string(), 80.0),
                ("rare".to_string(), 15.0),
                ("epic".to_string(), 4.0),
                ("legendary".to_string(), 1.0),
            ]
            .into(),
            fallback: 80.0,
        }
    }
}
