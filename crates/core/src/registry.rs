//! Backend registry
//!
//! Maps service names to configured storage backends and designates the
//! default one. Built once per invocation; see `cmdata-backends` for the
//! construction from configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::traits::StorageBackend;

/// Configured backends keyed by service name
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Arc<dyn StorageBackend>>,
    default: Option<String>,
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its kind's identifier, replacing any previous one
    pub fn register(&mut self, backend: Arc<dyn StorageBackend>) {
        let name = backend.kind().as_str().to_string();
        tracing::debug!(service = %name, "registered backend");
        self.backends.insert(name, backend);
    }

    /// Set the service used when a caller expresses no preference
    ///
    /// The name is not checked here; an unregistered default fails at resolve time.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default = Some(name.into());
    }

    /// The configured default service name
    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Names of all registered services
    pub fn names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    /// Return the named backend, or the default one when `name` is `None`
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn StorageBackend>> {
        let name = match name {
            Some(n) => n,
            None => self.default.as_deref().ok_or_else(|| {
                Error::BackendUnconfigured(
                    "no service given and no default.service configured".into(),
                )
            })?,
        };

        self.backends.get(name).cloned().ok_or_else(|| {
            let known = if self.backends.is_empty() {
                "none".to_string()
            } else {
                self.names().join(", ")
            };
            Error::BackendUnconfigured(format!("'{name}' (configured services: {known})"))
        })
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .field("default", &self.default)
            .finish()
    }
}
