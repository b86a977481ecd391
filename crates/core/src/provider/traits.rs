use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::{AuthenticatedIdentity, CallbackParams, ProviderSettings, Result};

/// Abstraction over identity provider protocol clients.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Registry key, e.g. `google`.
    fn key(&self) -> &str;

    /// Human readable provider name.
    fn name(&self) -> &str;

    /// Whether the provider takes a user-supplied identifier.
    fn accepts_identifier(&self) -> bool {
        false
    }

    /// Authorization endpoint URI for the user redirect. `settings.state` must
    /// be forwarded unmodified as the `state` parameter.
    async fn authorization_url(&self, settings: &ProviderSettings) -> Result<Url>;

    /// Exchange the callback parameters for the authenticated identity.
    async fn exchange(
        &self,
        settings: &ProviderSettings,
        params: &CallbackParams,
    ) -> Result<AuthenticatedIdentity>;
}

/// Lookup of provider clients by key.
pub trait ProviderRegistry: Send + Sync {
    /// Client registered under `key`. Keys are compared case-insensitively.
    fn client(&self, key: &str) -> Option<Arc<dyn ProviderClient>>;

    /// Registered keys, sorted.
    fn keys(&self) -> Vec<String>;
}
