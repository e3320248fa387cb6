//! Per-credential provider client cache
//!
//! Repeated cycles must not reconstruct credentials or connections, so the
//! orchestrator owns one explicit cache keyed by credential identity. The
//! cache is append-only for the engine's lifetime: entries are added via
//! insert-if-absent and never removed or mutated, so concurrent cycles
//! (not expected, but tolerated) cannot corrupt it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::AccountCredentials;
use crate::error::Result;
use crate::traits::{DnsProvider, DnsProviderFactory};

/// Cache of provider clients keyed by credential pair
pub struct ClientCache {
    factory: Box<dyn DnsProviderFactory>,
    clients: RwLock<HashMap<String, Arc<dyn DnsProvider>>>,
}

impl ClientCache {
    /// Create an empty cache backed by the given factory
    pub fn new(factory: Box<dyn DnsProviderFactory>) -> Self {
        Self {
            factory,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Get the cached client for the credentials, constructing it on first use
    pub fn get_or_create(&self, credentials: &AccountCredentials) -> Result<Arc<dyn DnsProvider>> {
        let key = credentials.cache_key();

        {
            let clients = self.clients.read().unwrap();
            if let Some(client) = clients.get(&key) {
                return Ok(Arc::clone(client));
            }
        }

        let client = self.factory.create(credentials)?;

        let mut clients = self.clients.write().unwrap();
        // insert-if-absent: if another cycle raced us here, keep its entry
        let entry = clients.entry(key).or_insert(client);
        Ok(Arc::clone(entry))
    }

    /// Number of cached clients
    pub fn len(&self) -> usize {
        self.clients.read().unwrap().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
