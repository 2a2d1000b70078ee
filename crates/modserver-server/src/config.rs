//! Server configuration from environment variables.
//!
//! | Variable                    | Default                             |
//! |-----------------------------|-------------------------------------|
//! | `MODSERVER_PORT`            | `1337`                              |
//! | `MODSERVER_SOURCE_DIR`      | `./src`                             |
//! | `MODSERVER_BUILD_DIR`       | `./build`                           |
//! | `MODSERVER_GRAPH_PATH`      | `<source dir>/module-graph.json`    |
//! | `MODSERVER_STATIC_DIR`      | unset (no `/static` route)          |
//! | `MODSERVER_SOURCE_ROOT_URL` | `http://127.0.0.1:<port>/_js`       |
//! | `MODSERVER_DEBUG_MARKERS`   | `true`                              |
//! | `MODSERVER_DEP_ORDER`       | `dependency-first`                  |
//! | `MODSERVER_REGISTRY`        | `ModuleServer.m`                    |

use std::path::PathBuf;

use modserver_core::graph::UnknownDepOrder;
use modserver_core::{DepOrder, DEFAULT_REGISTRY_NAMESPACE};
use thiserror::Error;

/// Errors in environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MODSERVER_PORT must be a port number, got '{0}'")]
    InvalidPort(String),

    #[error("{var} must be true or false, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("MODSERVER_DEP_ORDER: {0}")]
    DepOrder(#[from] UnknownDepOrder),
}

/// Settings for one server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
    /// Original (pre-compilation) sources, served under `/_js/`.
    pub source_dir: PathBuf,
    /// Compiled `<module>.js` and `<module>.js.map` files.
    pub build_dir: PathBuf,
    /// The module graph artifact.
    pub graph_path: PathBuf,
    /// Loader script and other static assets, served under `/static/`.
    pub static_dir: Option<PathBuf>,
    /// `sourceRoot` written into every source map section.
    pub source_root_url: String,
    /// Emit a comment naming each module in payloads.
    pub debug_markers: bool,
    /// Ordering convention of the graph artifact's dependency lists.
    pub dep_order: DepOrder,
    /// Registry expression that payload registration lines write to.
    pub registry_namespace: String,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, applying defaults for
    /// anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("MODSERVER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 1337,
        };

        let source_dir = lookup("MODSERVER_SOURCE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./src"));
        let build_dir = lookup("MODSERVER_BUILD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./build"));
        let graph_path = lookup("MODSERVER_GRAPH_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| source_dir.join("module-graph.json"));
        let static_dir = lookup("MODSERVER_STATIC_DIR").map(PathBuf::from);

        let source_root_url = lookup("MODSERVER_SOURCE_ROOT_URL")
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/_js", port));

        let debug_markers = match lookup("MODSERVER_DEBUG_MARKERS") {
            Some(raw) => parse_bool("MODSERVER_DEBUG_MARKERS", raw)?,
            None => true,
        };

        let dep_order = match lookup("MODSERVER_DEP_ORDER") {
            Some(raw) => raw.parse()?,
            None => DepOrder::default(),
        };

        let registry_namespace = lookup("MODSERVER_REGISTRY")
            .unwrap_or_else(|| DEFAULT_REGISTRY_NAMESPACE.to_string());

        Ok(ServerConfig {
            port,
            source_dir,
            build_dir,
            graph_path,
            static_dir,
            source_root_url,
            debug_markers,
            dep_order,
            registry_namespace,
        })
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}
