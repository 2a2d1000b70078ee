//! Page-side module loader.
//!
//! [`ModuleLoader`] tracks which modules a page session has requested and
//! received, guarantees at most one outstanding fetch per module, and builds
//! request URLs that tell the server which modules it need not resend.
//!
//! The loader is a single-threaded state machine: every method takes
//! `&mut self`. The host environment supplies a [`Fetch`] implementation and
//! reports each fetch's outcome back through [`ModuleLoader::complete`] after
//! the delivered payload has executed and populated the [`Registry`].

pub mod error;
pub mod loader;
pub mod registry;
pub mod url;

pub use error::LoadError;
pub use loader::{Continuation, Fetch, ModuleLoader, ModuleState};
pub use registry::Registry;
pub use url::{request_url, UrlBuilder};
