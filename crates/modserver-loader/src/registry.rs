//! The page registry written by executed payloads.
//!
//! Each payload ends every module with a registration line storing that
//! module's export under its key. One registry exists per page session and
//! is passed by reference to the loader.

use std::collections::HashMap;

/// Module key to exported value.
#[derive(Debug, Clone)]
pub struct Registry<V> {
    exports: HashMap<String, V>,
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Registry {
            exports: HashMap::new(),
        }
    }

    /// Records a module's export, as a registration line does when it runs.
    pub fn register(&mut self, key: impl Into<String>, export: V) {
        self.exports.insert(key.into(), export);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.exports.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.exports.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}
