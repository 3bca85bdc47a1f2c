//! Case configuration.
//!
//! Geometry, pricing and the rarity weight table come from
//! data/case_config.json. In tests, use CaseConfig::default_test().

use crate::{
    catalog::RarityWeightTable,
    tape::{TAPE_LENGTH, WINNER_SLOT_FROM_END},
    types::Millis,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    /// Price of one open, in gcoins.
    pub case_price: i64,
    /// Number of slots on the reel tape.
    pub tape_length: usize,
    /// Winner slot measured from the end of the tape.
    pub winner_slot_from_end: usize,
    /// Rendered width of one tape slot, in visual units.
    pub item_width: f64,
    /// Length of the timed reveal transition.
    pub reveal_duration_ms: Millis,
    /// Stop-point jitter bound, in visual units.
    pub jitter_bound: f64,
    pub rarity_weights: HashMap<String, f64>,
    /// Weight for rarity labels missing from the table.
    pub fallback_weight: f64,
}

impl CaseConfig {
    /// Load from the data/ directory.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/case_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: CaseConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with the reference values for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            case_price: 150,
            tape_length: TAPE_LENGTH,
            winner_slot_from_end: WINNER_SLOT_FROM_END,
            item_width: 200.0,
            reveal_duration_ms: 7_500,
            jitter_bound: 40.0,
            rarity_weights: [
                ("common".to_string(), 80.0),
                ("rare".to_string(), 15.0),
                ("epic".to_string(), 4.0),
                ("legendary".to_string(), 1.0),
            ]
            .into(),
            fallback_weight: 80.0,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.case_price <= 0 {
            anyhow::bail!("case_price must be positive, got {}", self.case_price);
        }
        if self.winner_slot_from_end == 0 || self.winner_slot_from_end > self.tape_length {
            anyhow::bail!(
                "winner_slot_from_end {} must be in 1..={}",
                self.winner_slot_from_end,
                self.tape_length
            );
        }
        if self.item_width <= 0.0 {
            anyhow::bail!("item_width must be positive");
        }
        if self.reveal_duration_ms == 0 {
            anyhow::bail!("reveal_duration_ms must be positive");
        }
        if self.jitter_bound < 0.0 {
            anyhow::bail!("jitter_bound must not be negative");
        }
        if self.fallback_weight <= 0.0 {
            anyhow::bail!("fallback_weight must be positive");
        }
        for (rarity, weight) in &self.rarity_weights {
            if *weight <= 0.0 {
                anyhow::bail!("weight for rarity '{rarity}' must be positive, got {weight}");
            }
        }
        Ok(())
    }

    /// Absolute slot index the outcome is planted at.
    pub fn winner_index(&self) -> usize {
        self.tape_length - self.winner_slot_from_end
    }

    pub fn weight_table(&self) -> RarityWeightTable {
        RarityWeightTable::new(self.rarity_weights.clone(), self.fallback_weight)
    }
}
