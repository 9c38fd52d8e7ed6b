//! Plugin-based backend registry
//!
//! The registry allows DNS backends to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonesync_core::registry::BackendRegistry;
//! use zonesync_core::config::BackendConfig;
//!
//! // Create a registry
//! let registry = BackendRegistry::new();
//!
//! // Register backends
//! registry.register_backend("powerdns", Box::new(powerdns_factory));
//!
//! // Create backend from config
//! let config = BackendConfig::PowerDns { ... };
//! let backend = registry.create_backend(&config)?;
//! ```
//!
//! ## Registration
//!
//! Backend crates expose a `register()` function:
//!
//! ```rust,ignore
//! // In zonesync-provider-powerdns
//! pub fn register(registry: &BackendRegistry) {
//!     registry.register_backend("powerdns", Box::new(PowerDnsFactory));
//! }
//! ```

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsBackend, DnsBackendFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Backend registry for plugin-based DNS backend creation
///
/// The registry maintains a map of backend type names to factory objects,
/// allowing dynamic instantiation of backends based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct BackendRegistry {
    /// Registered DNS backend factories
    backends: RwLock<HashMap<String, Box<dyn DnsBackendFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS backend factory
    ///
    /// Registering a name twice replaces the earlier factory.
    ///
    /// # Parameters
    ///
    /// - `name`: Backend type name (e.g., "powerdns")
    /// - `factory`: Factory object for creating backend instances
    pub fn register_backend(&self, name: impl Into<String>, factory: Box<dyn DnsBackendFactory>) {
        let name = name.into();
        let mut backends = self.backends.write().unwrap_or_else(PoisonError::into_inner);
        backends.insert(name, factory);
    }

    /// Create a DNS backend from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsBackend>)`: Created backend instance
    /// - `Err(Error)`: If the backend type is not registered or creation fails
    pub fn create_backend(&self, config: &BackendConfig) -> Result<Box<dyn DnsBackend>> {
        let backend_type = config.type_name();
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);

        let factory = backends
            .get(backend_type)
            .ok_or_else(|| Error::config(format!("Unknown backend type: {}", backend_type)))?;

        factory.create(config)
    }

    /// List all registered backend types
    pub fn list_backends(&self) -> Vec<String> {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend type is registered
    pub fn has_backend(&self, name: &str) -> bool {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        backends.contains_key(name)
    }
}
