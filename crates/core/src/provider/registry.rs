use std::collections::HashMap;
use std::sync::Arc;

use super::{normalize_key, ProviderClient, ProviderRegistry};

/// In-memory `ProviderRegistry` built once at startup.
#[derive(Clone, Default)]
pub struct ProviderCatalog {
    clients: HashMap<String, Arc<dyn ProviderClient>>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under its own key, replacing any previous client
    /// with the same key. Clients with a blank key are ignored.
    pub fn register(&mut self, client: Arc<dyn ProviderClient>) -> Option<Arc<dyn ProviderClient>> {
        let Some(key) = normalize_key(client.key()) else {
            tracing::warn!("ignoring provider client with a blank key");
            return None;
        };
        self.clients.insert(key, client)
    }

    /// Builder-style `register`.
    pub fn with(mut self, client: Arc<dyn ProviderClient>) -> Self {
        self.register(client);
        self
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl ProviderRegistry for ProviderCatalog {
    fn client(&self, key: &str) -> Option<Arc<dyn ProviderClient>> {
        normalize_key(key).and_then(|key| self.clients.get(&key).cloned())
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.clients.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for ProviderCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCatalog")
            .field("providers", &self.keys())
            .finish()
    }
}
