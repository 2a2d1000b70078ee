//! Payload assembly for the module server.
//!
//! This crate turns a resolved, ordered module list into the single script
//! document delivered to the page, optionally with a sectioned source map.
//!
//! # Modules
//!
//! - [`error`] -- Error types for request and assembly failures
//! - [`assembler`] -- Concatenation and source-map offset stitching
//! - [`sectioned`] -- The sectioned version-3 source map document
//! - [`server`] -- [`ModuleServer`], the graph + store facade serving requests

pub mod assembler;
pub mod error;
pub mod sectioned;
pub mod server;

pub use assembler::{assemble, AssembleOptions, Payload};
pub use error::BundleError;
pub use sectioned::{Offset, Section, SectionedSourceMap};
pub use server::{ModuleRequest, ModuleServer};
