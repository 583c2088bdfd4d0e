//! Error types for the voxedit engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    /// The active change set is full. `changed` blocks were applied before stopping.
    #[error("change limit of {limit} blocks exceeded ({changed} blocks changed)")]
    ChangeLimitExceeded { limit: usize, changed: usize },

    #[error("world '{0}' is no longer loaded")]
    WorldUnloaded(String),

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("unsupported region operation: {0}")]
    RegionOperation(String),

    #[error("invalid block type: {0}")]
    InvalidBlockType(u16),

    #[error("block type {0} is not allowed")]
    DisallowedBlock(u16),

    #[error("{what} of {value} exceeds the maximum of {max}")]
    LimitExceeded {
        what: &'static str,
        value: i64,
        max: i64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),
}
