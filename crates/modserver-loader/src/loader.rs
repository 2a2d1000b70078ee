//! [`ModuleLoader`]: per-session request deduplication and completion fan-out.
//!
//! Each module key moves through `NotRequested -> Requested -> Loaded`, and
//! `Loaded` is terminal. A failed fetch notifies every waiter with an error
//! and returns the key to `NotRequested`, so a later `load` fetches again.
//!
//! Ordering of payload execution is the host's responsibility: a payload must
//! finish executing, in request order, before its completion is reported and
//! before any later payload runs.

use std::collections::{HashMap, HashSet, VecDeque};

use modserver_core::registry_key;

use crate::error::LoadError;
use crate::registry::Registry;
use crate::url::{request_url, UrlBuilder};

/// Issues network fetches on behalf of the loader.
pub trait Fetch {
    /// Starts fetching the payload at `url`, which delivers module `key`.
    ///
    /// The host must later call [`ModuleLoader::complete`] with the same key
    /// once the payload has executed or the fetch has failed.
    fn fetch(&mut self, url: &str, key: &str);
}

/// Callback waiting for a module's export.
pub type Continuation<V> = Box<dyn FnOnce(Result<V, LoadError>)>;

/// Where a module key stands in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    NotRequested,
    Requested,
    Loaded,
}

/// Session state of the page-side loader.
pub struct ModuleLoader<F, V> {
    url_prefix: String,
    url_builder: UrlBuilder,
    fetcher: F,
    /// Keys requested this session, in request order.
    request_history: Vec<String>,
    loaded: HashSet<String>,
    /// In-flight key -> waiting continuations, FIFO.
    pending: HashMap<String, VecDeque<Continuation<V>>>,
}

impl<F, V> std::fmt::Debug for ModuleLoader<F, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("url_prefix", &self.url_prefix)
            .field("request_history", &self.request_history)
            .field("loaded", &self.loaded)
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<F: Fetch, V: Clone> ModuleLoader<F, V> {
    /// Creates a loader for the server at `url_prefix`. An empty prefix
    /// means `./`.
    pub fn new(url_prefix: impl Into<String>, fetcher: F) -> Self {
        let mut url_prefix = url_prefix.into();
        if url_prefix.is_empty() {
            url_prefix.push_str("./");
        }
        ModuleLoader {
            url_prefix,
            url_builder: request_url,
            fetcher,
            request_history: Vec::new(),
            loaded: HashSet::new(),
            pending: HashMap::new(),
        }
    }

    /// Replaces the URL scheme, for servers with a different path layout.
    pub fn with_url_builder(mut self, url_builder: UrlBuilder) -> Self {
        self.url_builder = url_builder;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Keys requested so far, in request order.
    pub fn request_history(&self) -> &[String] {
        &self.request_history
    }

    /// Current state of `name` (a path or an already-normalized key).
    pub fn state(&self, registry: &Registry<V>, name: &str) -> ModuleState {
        let key = registry_key(name);
        if registry.contains(&key) || self.loaded.contains(&key) {
            ModuleState::Loaded
        } else if self.pending.contains_key(&key) {
            ModuleState::Requested
        } else {
            ModuleState::NotRequested
        }
    }

    /// Requests module `name` and arranges for `continuation` to receive its
    /// export.
    ///
    /// Fires immediately when the module is already loaded, queues behind the
    /// outstanding fetch when one exists, and otherwise issues exactly one
    /// new fetch.
    pub fn load(
        &mut self,
        registry: &Registry<V>,
        name: &str,
        continuation: impl FnOnce(Result<V, LoadError>) + 'static,
    ) {
        let key = registry_key(name);

        match self.state(registry, &key) {
            ModuleState::Loaded => continuation(export(registry, &key)),
            ModuleState::Requested => {
                if let Some(queue) = self.pending.get_mut(&key) {
                    queue.push_back(Box::new(continuation));
                }
            }
            ModuleState::NotRequested => {
                let url = (self.url_builder)(&self.url_prefix, &key, &self.request_history);
                self.request_history.push(key.clone());

                let mut queue: VecDeque<Continuation<V>> = VecDeque::new();
                queue.push_back(Box::new(continuation));
                self.pending.insert(key.clone(), queue);

                tracing::debug!(module = %key, url = %url, "fetching module");
                self.fetcher.fetch(&url, &key);
            }
        }
    }

    /// Reports the outcome of the fetch for `key` and fires its waiters in
    /// the order they called `load`.
    ///
    /// Returns the number of continuations invoked.
    pub fn complete(
        &mut self,
        registry: &Registry<V>,
        key: &str,
        outcome: Result<(), String>,
    ) -> usize {
        let Some(queue) = self.pending.remove(key) else {
            tracing::warn!(module = %key, "completion for a module with no fetch in flight");
            return 0;
        };

        let fired = queue.len();
        match outcome {
            Ok(()) => {
                self.loaded.insert(key.to_string());
                for continuation in queue {
                    continuation(export(registry, key));
                }
            }
            Err(reason) => {
                tracing::warn!(module = %key, %reason, "module fetch failed");
                // The server never delivered it, so stop claiming to hold it.
                self.request_history.retain(|k| k != key);
                let err = LoadError::Fetch {
                    name: key.to_string(),
                    reason,
                };
                for continuation in queue {
                    continuation(Err(err.clone()));
                }
            }
        }
        fired
    }
}

fn export<V: Clone>(registry: &Registry<V>, key: &str) -> Result<V, LoadError> {
    registry.get(key).cloned().ok_or_else(|| LoadError::MissingExport {
        name: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct RecordingFetch {
        urls: Vec<String>,
    }

    impl Fetch for RecordingFetch {
        fn fetch(&mut self, url: &str, _key: &str) {
            self.urls.push(url.to_string());
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, tag: &'static str) -> impl FnOnce(Result<i32, LoadError>) + 'static {
        let log = Rc::clone(log);
        move |result| {
            let entry = match result {
                Ok(v) => format!("{}:{}", tag, v),
                Err(e) => format!("{}:err:{}", tag, e),
            };
            log.borrow_mut().push(entry);
        }
    }

    fn loader() -> ModuleLoader<RecordingFetch, i32> {
        ModuleLoader::new("/ms/", RecordingFetch::default())
    }

    #[test]
    fn concurrent_loads_share_one_fetch() {
        let mut loader = loader();
        let mut registry = Registry::new();
        let log: Log = Rc::default();

        loader.load(&registry, "a", recorder(&log, "cb1"));
        loader.load(&registry, "a", recorder(&log, "cb2"));
        assert_eq!(loader.fetcher().urls, vec!["/ms/module%24a"]);
        assert_eq!(loader.state(&registry, "a"), ModuleState::Requested);
        assert!(log.borrow().is_empty());

        registry.register("module$a", 7);
        assert_eq!(loader.complete(&registry, "module$a", Ok(())), 2);
        assert_eq!(*log.borrow(), vec!["cb1:7", "cb2:7"]);
        assert_eq!(loader.state(&registry, "a"), ModuleState::Loaded);
    }

    #[test]
    fn loaded_modules_fire_immediately_without_fetching() {
        let mut loader = loader();
        let mut registry = Registry::new();
        let log: Log = Rc::default();

        loader.load(&registry, "a", recorder(&log, "first"));
        registry.register("module$a", 1);
        loader.complete(&registry, "module$a", Ok(()));

        loader.load(&registry, "a", recorder(&log, "again"));
        assert_eq!(loader.fetcher().urls.len(), 1);
        assert_eq!(*log.borrow(), vec!["first:1", "again:1"]);
    }

    #[test]
    fn modules_delivered_as_dependencies_count_as_loaded() {
        let mut loader = loader();
        let mut registry = Registry::new();
        let log: Log = Rc::default();

        loader.load(&registry, "app", recorder(&log, "app"));
        // The payload for app also carried its dependency lib.
        registry.register("module$lib", 3);
        registry.register("module$app", 4);
        loader.complete(&registry, "module$app", Ok(()));

        loader.load(&registry, "lib", recorder(&log, "lib"));
        assert_eq!(loader.fetcher().urls.len(), 1);
        assert_eq!(*log.borrow(), vec!["app:4", "lib:3"]);
    }

    #[test]
    fn later_requests_carry_sorted_history() {
        let mut loader = loader();
        let registry = Registry::new();

        loader.load(&registry, "zeta", |_| {});
        loader.load(&registry, "alpha", |_| {});
        loader.load(&registry, "app/main", |_| {});

        assert_eq!(
            loader.fetcher().urls,
            vec![
                "/ms/module%24zeta",
                "/ms/module%24alpha/module%24zeta",
                "/ms/module%24app%24main/module%24alpha%2Cmodule%24zeta",
            ]
        );
        assert_eq!(
            loader.request_history(),
            ["module$zeta", "module$alpha", "module$app$main"]
        );
    }

    #[test]
    fn fetch_failure_reaches_every_waiter() {
        let mut loader = loader();
        let registry = Registry::new();
        let log: Log = Rc::default();

        loader.load(&registry, "a", recorder(&log, "cb1"));
        loader.load(&registry, "a", recorder(&log, "cb2"));
        assert_eq!(loader.complete(&registry, "module$a", Err("timeout".to_string())), 2);

        assert_eq!(
            *log.borrow(),
            vec![
                "cb1:err:failed to fetch module module$a: timeout",
                "cb2:err:failed to fetch module module$a: timeout",
            ]
        );
        assert_eq!(loader.state(&registry, "a"), ModuleState::NotRequested);
        assert!(loader.request_history().is_empty());
    }

    #[test]
    fn failed_module_is_fetched_again() {
        let mut loader = loader();
        let mut registry = Registry::new();
        let log: Log = Rc::default();

        loader.load(&registry, "a", |_| {});
        loader.complete(&registry, "module$a", Err("offline".to_string()));

        loader.load(&registry, "a", recorder(&log, "retry"));
        assert_eq!(loader.fetcher().urls, vec!["/ms/module%24a", "/ms/module%24a"]);

        registry.register("module$a", 9);
        loader.complete(&registry, "module$a", Ok(()));
        assert_eq!(*log.borrow(), vec!["retry:9"]);
    }

    #[test]
    fn missing_export_is_reported() {
        let mut loader = loader();
        let registry = Registry::new();
        let log: Log = Rc::default();

        loader.load(&registry, "a", recorder(&log, "cb"));
        loader.complete(&registry, "module$a", Ok(()));
        assert_eq!(*log.borrow(), vec!["cb:err:module module$a loaded but registered no export"]);
    }

    #[test]
    fn spurious_completion_is_ignored() {
        let mut loader = loader();
        let registry: Registry<i32> = Registry::new();
        assert_eq!(loader.complete(&registry, "module$never", Ok(())), 0);
        assert_eq!(loader.state(&registry, "never"), ModuleState::NotRequested);
    }

    #[test]
    fn empty_prefix_defaults_to_current_directory() {
        let mut loader: ModuleLoader<RecordingFetch, i32> =
            ModuleLoader::new("", RecordingFetch::default());
        loader.load(&Registry::new(), "a", |_| {});
        assert_eq!(loader.fetcher().urls, vec!["./module%24a"]);
    }

    #[test]
    fn custom_url_builder_is_used() {
        fn query_style(prefix: &str, key: &str, requested: &[String]) -> String {
            format!("{}?m={}&have={}", prefix, key, requested.len())
        }
        let mut loader = loader().with_url_builder(query_style);
        loader.load(&Registry::new(), "a", |_| {});
        assert_eq!(loader.fetcher().urls, vec!["/ms/?m=module$a&have=0"]);
    }
}
