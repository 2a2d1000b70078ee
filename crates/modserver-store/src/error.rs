//! Store error types for modserver-store.
//!
//! [`StoreError`] covers the ways startup loading can fail (any of which is
//! fatal) and lookups of modules the store never loaded.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by store loading and lookups.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A compiled source or source map file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source map file is not a valid source map document.
    #[error("corrupt source map {path}: {source}")]
    CorruptSourceMap {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A loader task panicked or was cancelled.
    #[error("artifact loader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Loading finished without every artifact accounted for.
    #[error("store incomplete: {loaded} of {expected} artifacts loaded")]
    Incomplete { loaded: usize, expected: usize },

    /// The store has no artifacts for this module.
    #[error("module not in store: {0}")]
    ModuleNotFound(String),
}
