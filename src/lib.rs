#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// CLI runner shared by the `running-order` binary.
pub mod apps;
/// Order configuration types.
pub mod config;
/// Centralized constants used across sources, shuffling, and persistence.
pub mod constants;
/// Record and category types.
pub mod data;
/// Block composition checks for an ordering.
pub mod metrics;
/// Persisted snapshot format and restore policies.
pub mod persistence;
/// Splitting an ordering into presentation sessions.
pub mod schedule;
/// Record store plus order store glued around the controller.
pub mod session;
/// Stratified block shuffle.
pub mod shuffle;
/// Order stores and persistence backends.
pub mod sidecar;
/// Row source traits and built-in CSV sources.
pub mod source;
/// Confirmation state machine.
pub mod state;
/// Loaded records with stable ids.
pub mod store;
/// Input transports used by sources and order stores (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::OrderConfig;
pub use data::{CategoryEntry, CategoryScheme, Record};
pub use errors::OrderError;
pub use metrics::{BlockComposition, block_composition, is_stratified};
pub use persistence::{PersistedState, RestorePolicy};
pub use schedule::{ScheduleConfig, SectionSpec, build_schedule};
pub use session::Session;
pub use shuffle::BlockShuffler;
pub use sidecar::{FileOrderStore, InMemoryOrderStore, OrderStore};
pub use source::{CsvFileSource, InMemoryCsvSource, RawRow, RowSource};
pub use state::{Confirmation, DisplayMode, OrderController, OrderState};
pub use store::RecordStore;
pub use types::{CategoryLabel, CategorySlug, SourceId, StableId};
