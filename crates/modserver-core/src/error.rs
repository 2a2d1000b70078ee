//! Core error types for modserver-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! graph loading, validation, and resolution failures.

use thiserror::Error;

/// Core errors produced by the modserver-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A requested, excluded, or queried module name is not in the graph.
    #[error("Unknown module: {name}")]
    NotFound { name: String },

    /// Two artifact entries share the same module name.
    #[error("duplicate module name: '{name}'")]
    DuplicateModule { name: String },

    /// A transitive-dependency list references a module the artifact never defines.
    #[error("module '{module}' depends on unknown module '{dependency}'")]
    UnknownDependency { module: String, dependency: String },

    /// The dependency relation contains a cycle (including self-dependency).
    #[error("dependency cycle involving module '{name}'")]
    Cycle { name: String },

    /// A module's dependency list is missing part of some dependency's closure.
    #[error("module '{module}' lists '{dependency}' but not its dependency '{missing}'")]
    IncompleteClosure {
        module: String,
        dependency: String,
        missing: String,
    },

    /// The graph artifact could not be read.
    #[error("failed to read graph artifact: {0}")]
    Io(#[from] std::io::Error),

    /// The graph artifact is not valid JSON of the expected shape.
    #[error("malformed graph artifact: {0}")]
    Serialization(#[from] serde_json::Error),
}
