//! Confirmation state machine.
//!
//! `OrderController` owns the record store, the RNG, and the single mutable
//! `OrderState`. The displayed order is always a full permutation of the
//! store's stable ids; it is recomputed only by a shuffle, a confirmation,
//! or a restore, never on read.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::OrderConfig;
use crate::data::Record;
use crate::errors::OrderError;
use crate::persistence::{self, PersistedState, RestorePolicy};
use crate::shuffle::BlockShuffler;
use crate::store::RecordStore;
use crate::types::StableId;

/// In-memory projection of the persisted order decision.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderState {
    /// Whether the order has been confirmed.
    pub confirmed: bool,
    /// Confirmed stable ids; empty while unconfirmed.
    pub order: Vec<StableId>,
}

impl OrderState {
    /// The initial state.
    pub fn unconfirmed() -> Self {
        Self::default()
    }

    /// A confirmed state over `order`.
    pub fn confirmed(order: Vec<StableId>) -> Self {
        Self {
            confirmed: true,
            order,
        }
    }
}

/// What the controller is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// No persisted state exists; records are shown in CSV order.
    SourceOrder,
    /// Unconfirmed preview of a block shuffle.
    Shuffled,
    /// The confirmed order.
    Confirmed,
}

/// Result of a `confirm` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// The order was confirmed now; the snapshot should be written out.
    Confirmed(PersistedState),
    /// The order was already confirmed; nothing changed.
    AlreadyConfirmed,
}

/// Owner of the running order for one session.
#[derive(Debug)]
pub struct OrderController {
    store: RecordStore,
    shuffler: BlockShuffler,
    rng: StdRng,
    cold_start_policy: RestorePolicy,
    import_policy: RestorePolicy,
    state: OrderState,
    display: Vec<StableId>,
    mode: DisplayMode,
    has_persisted: bool,
}

impl OrderController {
    /// Create a controller in source-order mode (no persisted state yet).
    ///
    /// The RNG is seeded from `config.seed` when set, otherwise from the OS.
    pub fn new(store: RecordStore, config: &OrderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(store, config, rng)
    }

    /// Create a controller with an explicit RNG.
    pub fn with_rng(store: RecordStore, config: &OrderConfig, rng: StdRng) -> Self {
        let display = store.identity_order().collect();
        Self {
            shuffler: BlockShuffler::new(config.categories.clone(), config.block_count),
            rng,
            cold_start_policy: config.cold_start_policy,
            import_policy: config.import_policy,
            state: OrderState::unconfirmed(),
            display,
            mode: DisplayMode::SourceOrder,
            has_persisted: false,
            store,
        }
    }

    /// Apply whatever persisted state was found at startup.
    ///
    /// With no persisted state the controller stays in source order. An
    /// unconfirmed snapshot starts a fresh shuffle. A confirmed snapshot is
    /// restored under the cold-start policy; if the policy rejects it, the
    /// error is returned and the controller falls back to an unconfirmed
    /// shuffle.
    pub fn boot(&mut self, persisted: Option<PersistedState>) -> Result<(), OrderError> {
        let Some(persisted) = persisted else {
            debug!("[running_order:state] no persisted order; showing source order");
            return Ok(());
        };
        self.has_persisted = true;
        if persisted.is_confirmed {
            match persistence::restore(&persisted, &self.store, self.cold_start_policy) {
                Ok(state) => {
                    self.apply_restored(state);
                    return Ok(());
                }
                Err(err) => {
                    warn!(
                        "[running_order:state] persisted order rejected at startup: {}",
                        err
                    );
                    // Keep the rejection visible even if the fallback shuffle works.
                    self.preview_shuffle().ok();
                    return Err(err);
                }
            }
        }
        self.preview_shuffle()
    }

    /// Confirm the displayed order, once.
    ///
    /// A second call is a no-op. When the display still shows the load order,
    /// or no persisted state exists, a fresh shuffle is confirmed instead.
    pub fn confirm(&mut self) -> Result<Confirmation, OrderError> {
        if self.state.confirmed {
            debug!("[running_order:state] confirm ignored; order already confirmed");
            return Ok(Confirmation::AlreadyConfirmed);
        }
        if self.needs_fresh_shuffle() {
            self.display = self.fresh_shuffle()?;
        }
        self.state = OrderState::confirmed(self.display.clone());
        self.mode = DisplayMode::Confirmed;
        self.has_persisted = true;
        info!(
            "[running_order:state] confirmed order {:?}",
            self.state.order
        );
        Ok(Confirmation::Confirmed(persistence::export(&self.state)))
    }

    /// Replace the current state with an imported snapshot.
    ///
    /// A confirmed snapshot is reconciled under the import policy. An
    /// unconfirmed snapshot discards any confirmation and starts a fresh
    /// shuffle. On error nothing changes.
    pub fn restore_from(&mut self, persisted: PersistedState) -> Result<&OrderState, OrderError> {
        if persisted.is_confirmed {
            let state = persistence::restore(&persisted, &self.store, self.import_policy)?;
            self.apply_restored(state);
        } else {
            let display = self.fresh_shuffle()?;
            self.state = OrderState::unconfirmed();
            self.display = display;
            self.mode = DisplayMode::Shuffled;
            info!("[running_order:state] imported unconfirmed state; reshuffled");
        }
        self.has_persisted = true;
        Ok(&self.state)
    }

    /// Decode `blob` and import it.
    pub fn restore_from_json(&mut self, blob: &str) -> Result<&OrderState, OrderError> {
        let persisted = persistence::decode(blob)?;
        self.restore_from(persisted)
    }

    /// Records in display order.
    pub fn current_order(&self) -> Vec<&Record> {
        self.store.resolve(&self.display)
    }

    /// Stable ids in display order.
    pub fn current_ids(&self) -> &[StableId] {
        &self.display
    }

    /// Whether the order is frozen.
    pub fn is_confirmed(&self) -> bool {
        self.state.confirmed
    }

    /// Current confirmation state.
    pub fn state(&self) -> &OrderState {
        &self.state
    }

    /// What is currently displayed.
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Whether a sidecar was found, imported, or produced this session.
    pub fn has_persisted_state(&self) -> bool {
        self.has_persisted
    }

    /// Loaded records.
    pub fn records(&self) -> &RecordStore {
        &self.store
    }

    /// Shuffler built from the config.
    pub fn shuffler(&self) -> &BlockShuffler {
        &self.shuffler
    }

    /// Snapshot of the current state for saving.
    pub fn export(&self) -> PersistedState {
        persistence::export(&self.state)
    }

    /// Confirming the load order by accident is never allowed: with no
    /// persisted state, or with the display still in load order, confirm
    /// shuffles first.
    fn needs_fresh_shuffle(&self) -> bool {
        !self.has_persisted || self.store.is_identity_order(&self.display)
    }

    fn preview_shuffle(&mut self) -> Result<(), OrderError> {
        self.display = self.fresh_shuffle()?;
        self.mode = DisplayMode::Shuffled;
        Ok(())
    }

    fn fresh_shuffle(&mut self) -> Result<Vec<StableId>, OrderError> {
        let order = self.shuffler.shuffle(self.store.records(), &mut self.rng)?;
        Ok(order.into_iter().map(|record| record.stable_id).collect())
    }

    fn apply_restored(&mut self, state: OrderState) {
        self.display = state.order.clone();
        self.state = state;
        self.mode = DisplayMode::Confirmed;
        info!(
            "[running_order:state] restored confirmed order {:?}",
            self.state.order
        );
    }
}
