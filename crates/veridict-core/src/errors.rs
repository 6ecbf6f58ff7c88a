//! Error types.
//!
//! Aggregation itself never errors on data-quality issues (unknown models,
//! missing payloads); those degrade and log. Errors here cover catalog
//! loading and the optimizer worker lifecycle.

/// Errors loading or constructing a model catalog.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate model id in catalog: {0}")]
    DuplicateModel(String),
}

/// Errors from a policy optimization run.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("optimization cancelled")]
    Cancelled,

    #[error("optimizer worker disconnected before completing")]
    WorkerDisconnected,

    #[error("optimizer worker failed: {0}")]
    Worker(String),
}
