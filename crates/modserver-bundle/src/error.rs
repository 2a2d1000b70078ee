//! Bundle error types covering request validation and assembly failures.

use modserver_core::CoreError;
use modserver_store::StoreError;

/// Errors that can occur while serving a module request.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// The request itself is malformed (no modules, empty names).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Graph loading or resolution failed (including unknown module names).
    #[error(transparent)]
    Graph(#[from] CoreError),

    /// Artifact loading or lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BundleError {
    /// The unknown module name, if this error is a not-found failure.
    pub fn not_found_name(&self) -> Option<&str> {
        match self {
            BundleError::Graph(CoreError::NotFound { name }) => Some(name),
            _ => None,
        }
    }
}
