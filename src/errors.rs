use std::io;

use thiserror::Error;

use crate::types::{CategoryLabel, SourceId};

/// Error type for loading, shuffling, confirming, and persisting a running order.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("source '{source_id}' produced no usable rows")]
    EmptyInput { source_id: SourceId },
    #[error("category '{category}' has {found} records; the block layout needs exactly {expected}")]
    CategoryImbalance {
        category: CategoryLabel,
        expected: usize,
        found: usize,
    },
    #[error("category '{label}' is not part of the shuffle scheme")]
    UnknownCategory { label: CategoryLabel },
    #[error("persisted order state is unusable: {0}")]
    MalformedPersistedState(String),
    #[error("source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
