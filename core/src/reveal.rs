//! The reveal timing controller.
//!
//! Owns the Idle → Locked → Animating → Settled state machine. The
//! state itself is the concurrency lock: open() on anything but Idle
//! is rejected, so two back-to-back opens can never issue two debits.
//!
//! RULES:
//!   - The full economic transaction runs inside Locked, before any
//!     visual change. On failure the controller returns to Idle with
//!     the reported reason and no visual side effect.
//!   - The tape is fully built and mounted before the timed transition
//!     is armed; nothing re-randomizes mid-flight.
//!   - Settlement happens on one armed deadline, not a poll loop, and
//!     the settled outcome is handed out exactly once.
//!
//! The controller never interprets business errors — the sequencer
//! decides those; this module only proceeds or returns to Idle.

use crate::{
    catalog::{Item, RarityWeightTable},
    config::CaseConfig,
    error::{CoreResult, DrawError},
    rng::DrawRng,
    sequencer::{self, DrawOutcome},
    store::{DrawEventLog, InventoryStore, ProfileStore},
    tape::{self, ReelTape},
    types::{Millis, ProfileId},
};

/// Where the mounted tape currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum ReelTransform {
    /// Tape mounted at zero offset; the transition is not armed yet.
    Mounted,
    /// Timed transition armed: fixed target, single deadline.
    Rolling {
        target_offset: f64,
        started_at: Millis,
        deadline: Millis,
    },
}

#[derive(Debug)]
pub enum RevealState {
    Idle,
    Locked,
    Animating {
        tape: ReelTape,
        outcome: DrawOutcome,
        transform: ReelTransform,
    },
    Settled {
        outcome: DrawOutcome,
    },
}

/// State discriminant, for guards and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Locked,
    Animating,
    Settled,
}

pub struct RevealController {
    state: RevealState,
    config: CaseConfig,
}

impl RevealController {
    /// `config` must have passed CaseConfig::validate; the winner index
    /// it yields is what makes tape construction infallible here.
    pub fn new(config: CaseConfig) -> Self {
        Self {
            state: RevealState::Idle,
            config,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        match self.state {
            RevealState::Idle => RevealPhase::Idle,
            RevealState::Locked => RevealPhase::Locked,
            RevealState::Animating { .. } => RevealPhase::Animating,
            RevealState::Settled { .. } => RevealPhase::Settled,
        }
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    /// The mounted tape, while one is mounted.
    pub fn tape(&self) -> Option<&ReelTape> {
        match &self.state {
            RevealState::Animating { tape, .. } => Some(tape),
            _ => None,
        }
    }

    /// Start a draw: Idle → Locked, run the economic transaction, then
    /// mount the tape and enter Animating at zero offset.
    ///
    /// Rejected with `DrawInProgress` unless Idle — the state is the
    /// lock. Any sequencer failure returns the controller to Idle.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        profile_id: &ProfileId,
        catalog: &[Item],
        weights: &RarityWeightTable,
        profiles: &dyn ProfileStore,
        inventory: &dyn InventoryStore,
        events: &dyn DrawEventLog,
        outcome_rng: &mut DrawRng,
        filler_rng: &mut DrawRng,
    ) -> CoreResult<()> {
        if !matches!(self.state, RevealState::Idle) {
            return Err(DrawError::DrawInProgress);
        }
        self.state = RevealState::Locked;

        let outcome = match sequencer::open_case(
            profile_id,
            self.config.case_price,
            catalog,
            weights,
            profiles,
            inventory,
            events,
            outcome_rng,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = RevealState::Idle;
                return Err(e);
            }
        };

        let tape = match ReelTape::build(
            &outcome.item,
            catalog,
            self.config.tape_length,
            self.config.winner_index(),
            weights,
            filler_rng,
        ) {
            Ok(tape) => tape,
            Err(e) => {
                // Unreachable with a validated config. The grant is
                // already persisted, so the outcome is not lost — only
                // its presentation is.
                log::error!("draw={} tape build failed: {e}", outcome.draw_id);
                self.state = RevealState::Idle;
                return Err(e);
            }
        };

        log::debug!(
            "reveal: mounted draw={} winner_slot={}",
            outcome.draw_id,
            tape.winner_index()
        );
        self.state = RevealState::Animating {
            tape,
            outcome,
            transform: ReelTransform::Mounted,
        };
        Ok(())
    }

    /// Arm the timed transition: compute the offset that centers the
    /// winner slot in the viewport (plus jitter) and schedule
    /// settlement one reveal duration from `now`.
    ///
    /// Returns the target offset. The tape is fixed from this point.
    pub fn launch(
        &mut self,
        viewport_width: f64,
        now: Millis,
        jitter_rng: &mut DrawRng,
    ) -> CoreResult<f64> {
        let RevealState::Animating { tape, transform, .. } = &mut self.state else {
            return Err(anyhow::anyhow!("launch outside Animating").into());
        };
        if matches!(transform, ReelTransform::Rolling { .. }) {
            return Err(anyhow::anyhow!("transition already armed").into());
        }

        let jitter = jitter_rng.jitter(self.config.jitter_bound);
        let target_offset = tape::target_offset(
            tape.winner_index(),
            self.config.item_width,
            viewport_width,
            jitter,
        );
        let deadline = now + self.config.reveal_duration_ms;
        *transform = ReelTransform::Rolling {
            target_offset,
            started_at: now,
            deadline,
        };
        log::debug!("reveal: armed target={target_offset:.1} deadline={deadline}");
        Ok(target_offset)
    }

    /// Settle the reveal if the armed deadline has passed:
    /// Animating → Settled, exactly once.
    ///
    /// Returns the outcome on that single transition so the caller can
    /// run its refresh hook; every other call returns None.
    pub fn on_clock(&mut self, now: Millis) -> Option<DrawOutcome> {
        let armed = matches!(
            &self.state,
            RevealState::Animating {
                transform: ReelTransform::Rolling { deadline, .. },
                ..
            } if now >= *deadline
        );
        if !armed {
            return None;
        }
        match std::mem::replace(&mut self.state, RevealState::Idle) {
            RevealState::Animating { outcome, .. } => {
                log::debug!("reveal: settled draw={}", outcome.draw_id);
                self.state = RevealState::Settled {
                    outcome: outcome.clone(),
                };
                Some(outcome)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Player acknowledgment from the settled screen: Settled → Idle.
    /// Returns the acknowledged outcome, or None outside Settled.
    pub fn acknowledge(&mut self) -> Option<DrawOutcome> {
        match std::mem::replace(&mut self.state, RevealState::Idle) {
            RevealState::Settled { outcome } => Some(outcome),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Eased reel offset at `now`, for rendering.
    ///
    /// Approximates the reference deceleration curve with an ease-out
    /// quintic. Easing never affects when settlement happens.
    pub fn offset_at(&self, now: Millis) -> f64 {
        match &self.state {
            RevealState::Animating {
                transform:
                    ReelTransform::Rolling {
                        target_offset,
                        started_at,
                        deadline,
                    },
                ..
            } => {
                let span = (deadline - started_at) as f64;
                let t = (now.saturating_sub(*started_at) as f64 / span).clamp(0.0, 1.0);
                let eased = 1.0 - (1.0 - t).powi(5);
                target_offset * eased
            }
            _ => 0.0,
        }
    }
}
