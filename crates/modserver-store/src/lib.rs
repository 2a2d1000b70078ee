//! Startup artifact cache for compiled modules.
//!
//! [`ModuleStore`] reads every module's compiled source and source map once,
//! concurrently, when the server starts. After that it is read-only and can
//! be shared across request handlers without locking.
//!
//! # Modules
//!
//! - [`error`]: StoreError enum with all failure modes
//! - [`source_map`]: the version-3 source map document
//! - [`store`]: ModuleStore and its concurrent loader

pub mod error;
pub mod source_map;
pub mod store;

// Re-export key types for ergonomic use.
pub use error::StoreError;
pub use source_map::SourceMap;
pub use store::{CachedModule, ModuleStore};
