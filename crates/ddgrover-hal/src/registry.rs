//! Backend registry.
//!
//! The [`BackendRegistry`] maps adapter names to factories so the CLI can
//! instantiate a backend from configuration without knowing its type.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::{Backend, BackendConfig, BackendFactory};
use crate::error::{HalError, HalResult};

/// Factory function type for registered backends.
type Factory = Box<dyn Fn(BackendConfig) -> HalResult<Arc<dyn Backend>> + Send + Sync>;

struct Entry {
    description: String,
    factory: Factory,
}

/// Central registry of backend factories.
pub struct BackendRegistry {
    entries: FxHashMap<String, Entry>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Register a backend type that can build itself from configuration.
    pub fn register<B>(&mut self, name: impl Into<String>, description: impl Into<String>)
    where
        B: BackendFactory + 'static,
    {
        self.register_factory(name, description, |config| {
            let backend = B::from_config(config)?;
            Ok(Arc::new(backend) as Arc<dyn Backend>)
        });
    }

    /// Register a backend with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Arc<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering backend: {}", name);
        self.entries.insert(
            name,
            Entry {
                description: description.into(),
                factory: Box::new(factory),
            },
        );
    }

    /// Instantiate the backend registered under `config.name`.
    pub fn create(&self, config: BackendConfig) -> HalResult<Arc<dyn Backend>> {
        let entry = self.entries.get(&config.name).ok_or_else(|| {
            HalError::Configuration(format!(
                "unknown backend '{}' (available: {})",
                config.name,
                self.names().join(", ")
            ))
        })?;
        (entry.factory)(config)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn list(&self) -> Vec<(String, String)> {
        self.names()
            .into_iter()
            .filter_map(|name| {
                let description = self.entries.get(&name)?.description.clone();
                Some((name, description))
            })
            .collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
