//! Module definitions and the serialized graph artifact entry.
//!
//! [`ModuleEntry`] mirrors one element of the artifact produced by the
//! compiler; [`Module`] is the validated in-memory form whose
//! `transitive_deps` are guaranteed to be dependency-first.

use serde::{Deserialize, Serialize};

/// One entry of the serialized module graph artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Unique module name.
    pub name: String,
    /// Original source files compiled into this module (informational).
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Every module this one needs, directly or indirectly.
    #[serde(rename = "transitive-dependencies", default)]
    pub transitive_dependencies: Vec<String>,
}

/// A validated module in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    /// Unique module name.
    pub name: String,
    /// Original source files compiled into this module.
    pub inputs: Vec<String>,
    /// All dependencies, ordered so each one precedes anything that needs it.
    pub transitive_deps: Vec<String>,
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Module: {}>", self.name)
    }
}
