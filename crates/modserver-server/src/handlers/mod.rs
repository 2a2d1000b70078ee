//! HTTP handler modules.
//!
//! Handlers parse the request path, fetch the shared [`ModuleServer`] from
//! the readiness slot, and delegate. No resolution or assembly logic lives
//! here.
//!
//! [`ModuleServer`]: modserver_bundle::ModuleServer

pub mod health;
pub mod modules;
