//! ModuleGraph: the immutable dependency graph and delivery-set resolution.
//!
//! [`ModuleGraph`] is built once from the serialized artifact and never
//! mutated afterwards. Construction validates the artifact:
//! - every referenced dependency is defined,
//! - the dependency relation is acyclic,
//! - each module's dependency list contains the full closure of each entry,
//! - each list is dependency-first (reordered when the artifact disagrees).
//!
//! [`ModuleGraph::resolve`] computes the ordered set of modules to deliver for
//! a request, given what the requester already holds.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CoreError;
use crate::module::{Module, ModuleEntry};

/// Ordering convention of the `transitive-dependencies` lists in an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepOrder {
    /// Each dependency precedes the modules that need it.
    #[default]
    DependencyFirst,
    /// Each dependent precedes its dependencies; lists are reversed on load.
    DependentFirst,
}

/// Error returned when parsing an unrecognized [`DepOrder`] name.
#[derive(Debug, Error)]
#[error("unknown dependency order '{0}' (expected 'dependency-first' or 'dependent-first')")]
pub struct UnknownDepOrder(pub String);

impl FromStr for DepOrder {
    type Err = UnknownDepOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dependency-first" => Ok(DepOrder::DependencyFirst),
            "dependent-first" => Ok(DepOrder::DependentFirst),
            other => Err(UnknownDepOrder(other.to_string())),
        }
    }
}

/// The module dependency graph.
///
/// Maps module names to validated [`Module`]s, preserving artifact order.
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    modules: IndexMap<String, Module>,
}

impl ModuleGraph {
    /// Builds and validates a graph from artifact entries.
    pub fn from_entries(entries: Vec<ModuleEntry>, order: DepOrder) -> Result<Self, CoreError> {
        let mut raw: IndexMap<String, ModuleEntry> = IndexMap::with_capacity(entries.len());
        for mut entry in entries {
            if order == DepOrder::DependentFirst {
                entry.transitive_dependencies.reverse();
            }
            if raw.contains_key(&entry.name) {
                return Err(CoreError::DuplicateModule { name: entry.name });
            }
            raw.insert(entry.name.clone(), entry);
        }

        check_references(&raw)?;
        check_acyclic(&raw)?;
        check_closures(&raw)?;

        let mut modules = IndexMap::with_capacity(raw.len());
        for (name, entry) in &raw {
            let transitive_deps = dependency_first(entry, &raw);
            if transitive_deps != entry.transitive_dependencies {
                tracing::warn!(module = %name, "dependency list was not dependency-first; reordered");
            }
            modules.insert(
                name.clone(),
                Module {
                    name: name.clone(),
                    inputs: entry.inputs.clone(),
                    transitive_deps,
                },
            );
        }

        tracing::debug!(modules = modules.len(), "module graph loaded");
        Ok(ModuleGraph { modules })
    }

    /// Parses a JSON artifact (an array of entries) and builds the graph.
    pub fn from_json(json: &str, order: DepOrder) -> Result<Self, CoreError> {
        let entries: Vec<ModuleEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries, order)
    }

    /// Reads a JSON artifact from disk and builds the graph.
    pub fn from_path(path: impl AsRef<Path>, order: DepOrder) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json, order)
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if the graph has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Returns `true` if a module with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Looks up a module by name.
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// All module names, in artifact order.
    pub fn all_module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Returns the dependency-first list of everything `name` needs.
    ///
    /// Returns [`CoreError::NotFound`] if the module does not exist.
    pub fn transitive_dependencies(&self, name: &str) -> Result<&[String], CoreError> {
        Ok(&self.module(name)?.transitive_deps)
    }

    /// Computes the ordered, deduplicated set of modules to deliver.
    ///
    /// Every requested module is returned together with its dependencies,
    /// minus every excluded module and everything an excluded module depends
    /// on. All names are checked before any output is produced, so an
    /// unknown name yields [`CoreError::NotFound`] and nothing else.
    ///
    /// The result is a topological order: each module's dependencies appear
    /// before it.
    pub fn resolve<S: AsRef<str>>(
        &self,
        requested: &[S],
        excluded: Option<&[S]>,
    ) -> Result<Vec<String>, CoreError> {
        let excluded = excluded.unwrap_or(&[]);

        let requested: Vec<&Module> = requested
            .iter()
            .map(|name| self.module(name.as_ref()))
            .collect::<Result<_, _>>()?;
        let excluded: Vec<&Module> = excluded
            .iter()
            .map(|name| self.module(name.as_ref()))
            .collect::<Result<_, _>>()?;

        let mut exclude: HashSet<&str> = HashSet::new();
        for module in excluded {
            exclude.insert(&module.name);
            exclude.extend(module.transitive_deps.iter().map(String::as_str));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut list = Vec::new();
        for module in requested {
            let names = module
                .transitive_deps
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(module.name.as_str()));
            for name in names {
                if !exclude.contains(name) && seen.insert(name) {
                    list.push(name.to_string());
                }
            }
        }
        Ok(list)
    }

    fn module(&self, name: &str) -> Result<&Module, CoreError> {
        self.modules.get(name).ok_or_else(|| CoreError::NotFound {
            name: name.to_string(),
        })
    }
}

/// Every dependency name must be defined, and no module may list itself.
fn check_references(raw: &IndexMap<String, ModuleEntry>) -> Result<(), CoreError> {
    for (name, entry) in raw {
        for dep in &entry.transitive_dependencies {
            if dep == name {
                return Err(CoreError::Cycle { name: name.clone() });
            }
            if !raw.contains_key(dep) {
                return Err(CoreError::UnknownDependency {
                    module: name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_acyclic(raw: &IndexMap<String, ModuleEntry>) -> Result<(), CoreError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(raw.len(), 0);
    let indices: Vec<NodeIndex> = raw.keys().map(|name| graph.add_node(name)).collect();

    // Edges point from dependency to dependent.
    for (i, entry) in raw.values().enumerate() {
        for dep in &entry.transitive_dependencies {
            if let Some(j) = raw.get_index_of(dep) {
                graph.add_edge(indices[j], indices[i], ());
            }
        }
    }

    toposort(&graph, None).map(|_| ()).map_err(|cycle| CoreError::Cycle {
        name: graph[cycle.node_id()].to_string(),
    })
}

/// Each listed dependency's own dependencies must also be listed.
fn check_closures(raw: &IndexMap<String, ModuleEntry>) -> Result<(), CoreError> {
    for (name, entry) in raw {
        let listed: HashSet<&str> = entry
            .transitive_dependencies
            .iter()
            .map(String::as_str)
            .collect();
        for dep in &entry.transitive_dependencies {
            for missing in &raw[dep].transitive_dependencies {
                if !listed.contains(missing.as_str()) {
                    return Err(CoreError::IncompleteClosure {
                        module: name.clone(),
                        dependency: dep.clone(),
                        missing: missing.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Returns the module's dependency list in dependency-first order.
///
/// A list that already satisfies the order is returned as given. Otherwise a
/// depth-first post-order walk from each entry produces a stable reordering.
/// Requires acyclic, closed lists (checked beforehand).
fn dependency_first(entry: &ModuleEntry, raw: &IndexMap<String, ModuleEntry>) -> Vec<String> {
    let deps = &entry.transitive_dependencies;
    let mut earlier: HashSet<&str> = HashSet::with_capacity(deps.len());
    let already_ordered = deps.iter().all(|dep| {
        let ok = raw[dep]
            .transitive_dependencies
            .iter()
            .all(|d| earlier.contains(d.as_str()));
        earlier.insert(dep);
        ok
    });
    if already_ordered {
        return deps.clone();
    }

    fn visit<'a>(
        name: &'a str,
        raw: &'a IndexMap<String, ModuleEntry>,
        visited: &mut HashSet<&'a str>,
        out: &mut Vec<String>,
    ) {
        if !visited.insert(name) {
            return;
        }
        for dep in &raw[name].transitive_dependencies {
            visit(dep, raw, visited, out);
        }
        out.push(name.to_string());
    }

    let mut visited = HashSet::with_capacity(deps.len());
    let mut out = Vec::with_capacity(deps.len());
    for dep in deps {
        visit(dep, raw, &mut visited, &mut out);
    }
    out
}
