//! Error types for building stores.

use std::path::PathBuf;

/// Errors raised while loading configuration or constructing a store.
///
/// Operations on a built store return [`corelib::Error`] directly.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The ring rejected the configuration or an initial node.
    #[error(transparent)]
    Ring(#[from] corelib::Error),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`crate::StoreConfig`].
    #[error("invalid store configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A strategy or partitioner name was not recognised.
    #[error("unknown {kind} {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
