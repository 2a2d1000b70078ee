//! Load outcome errors delivered to continuations.

use thiserror::Error;

/// Why a `load` continuation did not receive a module export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The fetch carrying this module failed in transport.
    #[error("failed to fetch module {name}: {reason}")]
    Fetch { name: String, reason: String },

    /// The fetch completed but the payload never registered an export.
    #[error("module {name} loaded but registered no export")]
    MissingExport { name: String },
}
