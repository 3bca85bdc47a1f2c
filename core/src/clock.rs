//! Reveal clock — owns "now" for the timing controller.
//!
//! The controller never reads wall time. A host drives the clock:
//! tests advance it directly, the runner advances it past the reveal
//! window after each open.

use crate::types::Millis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevealClock {
    now_ms: Millis,
}

impl RevealClock {
    pub fn new() -> Self {
        Self { now_ms: 0 }
    }

    pub fn now(&self) -> Millis {
        self.now_ms
    }

    /// Advance by `delta` milliseconds. Returns the new now.
    pub fn advance(&mut self, delta: Millis) -> Millis {
        self.now_ms += delta;
        self.now_ms
    }
}

impl Default for RevealClock {
    fn default() -> Self {
        Self::new()
    }
}
