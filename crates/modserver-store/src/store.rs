//! [`ModuleStore`]: compiled sources and source maps cached in memory.
//!
//! Loading issues two reads per module (`<name>.js` and `<name>.js.map`)
//! as independent tokio tasks and joins them all before returning. The store
//! only exists once every one of the `2 * module_count` reads has succeeded;
//! the first failure aborts the remaining reads and is returned as the
//! initialization error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use modserver_core::ModuleGraph;
use tokio::task::JoinSet;

use crate::error::StoreError;
use crate::source_map::SourceMap;

/// One module's cached artifacts.
#[derive(Debug, Clone)]
pub struct CachedModule {
    source: String,
    line_count: usize,
    map: SourceMap,
}

impl CachedModule {
    fn new(source: String, map: SourceMap) -> Self {
        let line_count = source.split('\n').count();
        CachedModule {
            source,
            line_count,
            map,
        }
    }

    /// The compiled source, verbatim.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of `\n`-delimited lines in the compiled source.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// A fresh copy of the parsed source map.
    pub fn source_map(&self) -> SourceMap {
        self.map.clone()
    }
}

enum Artifact {
    Source(String),
    Map(SourceMap),
}

/// Read-only cache of every module's compiled artifacts.
#[derive(Debug, Clone, Default)]
pub struct ModuleStore {
    modules: HashMap<String, CachedModule>,
}

impl ModuleStore {
    /// Loads the source and source map of every module in `graph` from
    /// `build_dir`, reading all files concurrently.
    pub async fn load(build_dir: impl AsRef<Path>, graph: &ModuleGraph) -> Result<Self, StoreError> {
        let build_dir = build_dir.as_ref();
        let expected = graph.len() * 2;

        let mut tasks = JoinSet::new();
        for name in graph.all_module_names() {
            let source_path = build_dir.join(format!("{}.js", name));
            let map_path = build_dir.join(format!("{}.js.map", name));

            let module = name.to_string();
            tasks.spawn(async move {
                let source = read(&source_path).await?;
                Ok::<_, StoreError>((module, Artifact::Source(source)))
            });

            let module = name.to_string();
            tasks.spawn(async move {
                let json = read(&map_path).await?;
                let map = SourceMap::from_json(&json)
                    .map_err(|source| StoreError::CorruptSourceMap { path: map_path, source })?;
                Ok::<_, StoreError>((module, Artifact::Map(map)))
            });
        }

        let mut sources: HashMap<String, String> = HashMap::with_capacity(graph.len());
        let mut maps: HashMap<String, SourceMap> = HashMap::with_capacity(graph.len());
        let mut loaded = 0;

        // Returning early drops the JoinSet, which aborts the remaining reads.
        while let Some(joined) = tasks.join_next().await {
            let (name, artifact) = joined??;
            match artifact {
                Artifact::Source(source) => {
                    sources.insert(name, source);
                }
                Artifact::Map(map) => {
                    maps.insert(name, map);
                }
            }
            loaded += 1;
        }

        if loaded != expected {
            return Err(StoreError::Incomplete { loaded, expected });
        }

        let mut modules = HashMap::with_capacity(sources.len());
        for (name, source) in sources {
            let map = maps.remove(&name).ok_or_else(|| StoreError::Incomplete {
                loaded: expected - 1,
                expected,
            })?;
            modules.insert(name, CachedModule::new(source, map));
        }

        tracing::info!(
            modules = modules.len(),
            artifacts = loaded,
            dir = %build_dir.display(),
            "module store ready"
        );
        Ok(ModuleStore { modules })
    }

    /// Builds a store from in-memory `(name, source, source map JSON)` triples.
    pub fn from_artifacts<I, N, S, M>(artifacts: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (N, S, M)>,
        N: Into<String>,
        S: Into<String>,
        M: AsRef<str>,
    {
        let mut modules = HashMap::new();
        for (name, source, map) in artifacts {
            let name = name.into();
            let map = SourceMap::from_json(map.as_ref()).map_err(|source| {
                StoreError::CorruptSourceMap {
                    path: PathBuf::from(format!("{}.js.map", name)),
                    source,
                }
            })?;
            modules.insert(name, CachedModule::new(source.into(), map));
        }
        Ok(ModuleStore { modules })
    }

    /// Number of cached modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if no modules are cached.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Looks up a module's cached artifacts.
    pub fn get(&self, name: &str) -> Result<&CachedModule, StoreError> {
        self.modules
            .get(name)
            .ok_or_else(|| StoreError::ModuleNotFound(name.to_string()))
    }

    /// The compiled source of a module.
    pub fn source(&self, name: &str) -> Result<&str, StoreError> {
        Ok(self.get(name)?.source())
    }

    /// Line count of a module's compiled source.
    pub fn line_count(&self, name: &str) -> Result<usize, StoreError> {
        Ok(self.get(name)?.line_count())
    }

    /// An independent copy of a module's source map.
    pub fn source_map(&self, name: &str) -> Result<SourceMap, StoreError> {
        Ok(self.get(name)?.source_map())
    }
}

async fn read(path: &Path) -> Result<String, StoreError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })
}
