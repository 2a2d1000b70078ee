//! Core data model for the module server: module names, the dependency
//! graph artifact, and resolution of delivery sets.

pub mod error;
pub mod graph;
pub mod module;
pub mod name;

// Re-export commonly used types
pub use error::CoreError;
pub use graph::{DepOrder, ModuleGraph};
pub use module::{Module, ModuleEntry};
pub use name::{registry_key, DEFAULT_REGISTRY_NAMESPACE};
