//! Per-player session orchestration.
//!
//! The session is the wired root: it fetches the catalog snapshot once
//! per session (not per draw), owns the clock, the RNG streams and the
//! reveal controller, and refreshes cached profile state exactly once
//! per settlement.

use crate::{
    catalog::{Item, RarityWeightTable},
    clock::RevealClock,
    config::CaseConfig,
    error::CoreResult,
    event::DrawEvent,
    reveal::{RevealController, RevealPhase},
    rng::{DrawRng, RngBank, RngStream},
    sequencer::DrawOutcome,
    store::{CaseStore, CatalogProvider, DrawEventLog, InventoryRow, ProfileStore},
    types::{Millis, ProfileId},
};

pub struct CaseSession {
    profile_id: ProfileId,
    store: CaseStore,
    config: CaseConfig,
    weights: RarityWeightTable,
    catalog: Vec<Item>,
    clock: RevealClock,
    controller: RevealController,
    outcome_rng: DrawRng,
    filler_rng: DrawRng,
    jitter_rng: DrawRng,
    cached_balance: i64,
}

impl CaseSession {
    /// Wire a session for one profile. The catalog snapshot and the
    /// starting balance are fetched here, once.
    pub fn new(
        profile_id: ProfileId,
        store: CaseStore,
        config: CaseConfig,
        seed: u64,
    ) -> CoreResult<Self> {
        let bank = RngBank::new(seed);
        let catalog = store.list_items()?;
        let cached_balance = store.get_balance(&profile_id)?;
        let weights = config.weight_table();
        log::debug!(
            "session: profile={profile_id} catalog={} balance={cached_balance}",
            catalog.len()
        );
        Ok(Self {
            profile_id,
            controller: RevealController::new(config.clone()),
            config,
            weights,
            catalog,
            clock: RevealClock::new(),
            outcome_rng: bank.for_stream(RngStream::Outcome),
            filler_rng: bank.for_stream(RngStream::Filler),
            jitter_rng: bank.for_stream(RngStream::Jitter),
            cached_balance,
            store,
        })
    }

    /// Session over a freshly migrated in-memory store with the
    /// reference catalog and the given starting balance. Used in tests.
    pub fn build_test(profile_id: &str, gcoins: i64, seed: u64) -> CoreResult<Self> {
        let store = CaseStore::in_memory()?;
        store.migrate()?;
        store.insert_profile(&profile_id.to_string(), profile_id, gcoins)?;
        for item in reference_catalog() {
            store.insert_item(&item)?;
        }
        Self::new(
            profile_id.to_string(),
            store,
            CaseConfig::default_test(),
            seed,
        )
    }

    /// Balance as of the last settlement (or session start). The live
    /// value sits in the profile store; this is the display copy.
    pub fn balance(&self) -> i64 {
        self.cached_balance
    }

    pub fn phase(&self) -> RevealPhase {
        self.controller.phase()
    }

    pub fn controller(&self) -> &RevealController {
        &self.controller
    }

    pub fn catalog(&self) -> &[Item] {
        &self.catalog
    }

    pub fn config(&self) -> &CaseConfig {
        &self.config
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    /// User-initiated open. Rejected unless the controller is Idle.
    pub fn open(&mut self) -> CoreResult<()> {
        self.controller.open(
            &self.profile_id,
            &self.catalog,
            &self.weights,
            &self.store,
            &self.store,
            &self.store,
            &mut self.outcome_rng,
            &mut self.filler_rng,
        )
    }

    /// Arm the reel transition against the session clock.
    pub fn launch(&mut self, viewport_width: f64) -> CoreResult<f64> {
        let now = self.clock.now();
        self.controller.launch(viewport_width, now, &mut self.jitter_rng)
    }

    /// Advance the session clock. If the armed deadline is reached the
    /// draw settles: the settlement is recorded and cached profile
    /// state refreshes, exactly once per draw.
    pub fn advance(&mut self, delta_ms: Millis) -> CoreResult<Option<DrawOutcome>> {
        let now = self.clock.advance(delta_ms);
        let Some(outcome) = self.controller.on_clock(now) else {
            return Ok(None);
        };
        self.store.append_event(
            &self.profile_id,
            &DrawEvent::DrawSettled {
                draw_id: outcome.draw_id.clone(),
                item_id: outcome.item.item_id.clone(),
            },
        )?;
        self.cached_balance = self.store.get_balance(&self.profile_id)?;
        log::debug!(
            "session: settled draw={} item={} balance={}",
            outcome.draw_id,
            outcome.item.item_id,
            self.cached_balance
        );
        Ok(Some(outcome))
    }

    /// Player acknowledgment from the settled screen.
    pub fn acknowledge(&mut self) -> Option<DrawOutcome> {
        self.controller.acknowledge()
    }

    pub fn inventory(&self) -> CoreResult<Vec<InventoryRow>> {
        self.store.inventory_for_profile(&self.profile_id)
    }
}

/// The reference catalog used by build_test and seeding tools.
pub fn reference_catalog() -> Vec<Item> {
    let item = |item_id: &str, name: &str, price: i64, rarity: &str| Item {
        item_id: item_id.to_string(),
        name: name.to_string(),
        price,
        rarity: rarity.to_string(),
        image_url: None,
        custom_color: None,
    };
    vec![
        item("soda", "Soda", 25, "common"),
        item("nesergey", "Nesergey", 30, "common"),
        item("chill", "Chill", 40, "common"),
        item("epic", "Epic", 320, "rare"),
        item("akashi", "Akashi", 900, "epic"),
        item("twink-expa", "Twink Expa", 2400, "legendary"),
        Item {
            custom_color: Some("#7b2ff7".to_string()),
            ..item("amnesia", "Amnesia", 5000, "legendary")
        },
    ]
}
