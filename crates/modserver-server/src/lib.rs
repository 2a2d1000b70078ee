//! HTTP server delivering precompiled modules and their source maps.
//!
//! Routes requests of the form `/<modules>[/<held>]` to the
//! [`ModuleServer`](modserver_bundle::ModuleServer), serves the matching
//! sectioned source maps under `/_sourcemap/`, and passes original sources
//! through under `/_js/` for debuggers. This crate contains the server
//! configuration, readiness state, error mapping, and route definitions.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod state;
