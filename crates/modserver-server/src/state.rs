//! Application state: configuration plus the readiness slot.
//!
//! The listener starts before the module artifacts finish loading. Until
//! [`AppState::initialize`] succeeds, every module request is answered with
//! `503 NOT_READY`; if loading fails, the failure message is kept and
//! returned with every subsequent `503`. Once ready, the [`ModuleServer`] is
//! immutable and shared through an `Arc`, so request handlers only ever take
//! the read side of the lock.

use std::sync::Arc;

use modserver_bundle::{AssembleOptions, ModuleServer};
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Lifecycle of the module artifacts.
#[derive(Debug, Clone)]
pub enum Readiness {
    /// Startup reads still in flight.
    Loading,
    /// Every artifact loaded.
    Ready(Arc<ModuleServer>),
    /// Startup loading failed; the server stays unavailable.
    Failed(String),
}

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    readiness: Arc<RwLock<Readiness>>,
}

impl AppState {
    /// Creates state in the `Loading` phase.
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            config: Arc::new(config),
            readiness: Arc::new(RwLock::new(Readiness::Loading)),
        }
    }

    /// Creates state around an already-loaded module server.
    pub fn ready(config: ServerConfig, server: ModuleServer) -> Self {
        AppState {
            config: Arc::new(config),
            readiness: Arc::new(RwLock::new(Readiness::Ready(Arc::new(server)))),
        }
    }

    /// Loads the graph and every module artifact named by the config, then
    /// records the outcome. A failure is logged here, once.
    pub async fn initialize(&self) -> Result<(), ApiError> {
        let config = &self.config;
        let loaded =
            ModuleServer::load(&config.graph_path, &config.build_dir, config.dep_order).await;

        let mut readiness = self.readiness.write().await;
        match loaded {
            Ok(server) => {
                tracing::info!(modules = server.graph().len(), "module server ready");
                *readiness = Readiness::Ready(Arc::new(server));
                Ok(())
            }
            Err(err) => {
                let message = format!("module server failed to initialize: {}", err);
                tracing::error!("{}", message);
                *readiness = Readiness::Failed(message.clone());
                Err(ApiError::NotReady(message))
            }
        }
    }

    pub async fn readiness(&self) -> Readiness {
        self.readiness.read().await.clone()
    }

    /// The loaded module server, or `NotReady`.
    pub async fn server(&self) -> Result<Arc<ModuleServer>, ApiError> {
        match &*self.readiness.read().await {
            Readiness::Ready(server) => Ok(Arc::clone(server)),
            Readiness::Loading => Err(ApiError::NotReady(
                "module server not loaded yet".to_string(),
            )),
            Readiness::Failed(message) => Err(ApiError::NotReady(message.clone())),
        }
    }

    /// Assembly options for a module or source-map request.
    pub fn assemble_options(&self, build_source_map: bool) -> AssembleOptions {
        AssembleOptions {
            include_debug_markers: self.config.debug_markers,
            build_source_map,
            source_root_prefix: Some(self.config.source_root_url.clone()),
            registry_namespace: self.config.registry_namespace.clone(),
            ..AssembleOptions::default()
        }
    }
}
