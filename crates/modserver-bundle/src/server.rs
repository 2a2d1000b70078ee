//! [`ModuleServer`]: the graph and artifact store behind every request.
//!
//! Both halves are immutable once constructed, so a `ModuleServer` can be
//! shared across concurrent requests without locking.

use std::path::Path;

use modserver_core::{DepOrder, ModuleGraph};
use modserver_store::{ModuleStore, StoreError};
use serde::{Deserialize, Serialize};

use crate::assembler::{assemble, AssembleOptions, Payload};
use crate::error::BundleError;

/// A request for modules, naming what the requester already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRequest {
    /// Modules the requester wants.
    pub modules: Vec<String>,
    /// Modules the requester already has; these and their dependencies are
    /// left out of the payload.
    #[serde(default)]
    pub held: Vec<String>,
}

impl ModuleRequest {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModuleRequest {
            modules: modules.into_iter().map(Into::into).collect(),
            held: Vec::new(),
        }
    }

    pub fn with_held<I, S>(mut self, held: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.held = held.into_iter().map(Into::into).collect();
        self
    }

    /// Rejects structurally malformed requests before any resolution work.
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.modules.is_empty() {
            return Err(BundleError::InvalidRequest("no modules requested".to_string()));
        }
        if self.modules.iter().chain(&self.held).any(|name| name.is_empty()) {
            return Err(BundleError::InvalidRequest("empty module name".to_string()));
        }
        Ok(())
    }
}

/// Resolves requests against the graph and assembles payloads from the store.
#[derive(Debug)]
pub struct ModuleServer {
    graph: ModuleGraph,
    store: ModuleStore,
}

impl ModuleServer {
    /// Pairs a graph with its store. Every module in the graph must have
    /// cached artifacts.
    pub fn new(graph: ModuleGraph, store: ModuleStore) -> Result<Self, BundleError> {
        if let Some(missing) = graph.all_module_names().find(|name| store.get(name).is_err()) {
            return Err(StoreError::ModuleNotFound(missing.to_string()).into());
        }
        Ok(ModuleServer { graph, store })
    }

    /// Loads the graph artifact, then every module's artifacts from
    /// `build_dir`. Fails on the first unreadable or corrupt file.
    pub async fn load(
        graph_path: impl AsRef<Path>,
        build_dir: impl AsRef<Path>,
        order: DepOrder,
    ) -> Result<Self, BundleError> {
        let graph = ModuleGraph::from_path(graph_path, order)?;
        let store = ModuleStore::load(build_dir, &graph).await?;
        Self::new(graph, store)
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    pub fn store(&self) -> &ModuleStore {
        &self.store
    }

    /// Resolves `request` and assembles the payload for it.
    pub fn serve(
        &self,
        request: &ModuleRequest,
        options: &AssembleOptions,
    ) -> Result<Payload, BundleError> {
        request.validate()?;
        tracing::debug!(modules = ?request.modules, held = ?request.held, "requesting modules");

        let excluded = (!request.held.is_empty()).then_some(request.held.as_slice());
        let names = self.graph.resolve(request.modules.as_slice(), excluded)?;
        tracing::debug!(serving = ?names, "resolved modules");

        assemble(&self.store, &names, options)
    }
}
