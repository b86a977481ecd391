//! Provider client implementations.
//!
//! This module contains implementations of `ProviderClient` for:
//! - OpenID Connect providers discovered from their issuer (Google and others)
//! - A mock provider backed by the mock IdP server (with `mock` feature)

#[cfg(feature = "mock")]
mod mock;
mod oidc;

#[cfg(feature = "mock")]
pub(crate) use mock::MockCode;
#[cfg(feature = "mock")]
pub use mock::{MockProvider, MOCK_PROVIDER_KEY};
pub use oidc::{nonce_for_state, OidcProvider};

use std::sync::Arc;

use loginbridge_core::provider::ProviderCatalog;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Build the provider registry from configuration.
///
/// # Errors
///
/// Returns `AuthError::Config` if any provider fails discovery.
#[cfg(not(feature = "mock"))]
pub async fn catalog_from_config(config: &AuthConfig) -> Result<ProviderCatalog, AuthError> {
    let mut catalog = ProviderCatalog::new();

    for provider in &config.providers {
        let client = OidcProvider::discover(provider).await.map_err(|e| {
            AuthError::Config(format!("provider '{}' unavailable: {e}", provider.key))
        })?;
        tracing::info!(provider = %provider.key, issuer = %provider.issuer, "provider registered");
        catalog.register(Arc::new(client));
    }

    if catalog.is_empty() {
        tracing::warn!("no identity providers configured");
    }

    Ok(catalog)
}

/// Build the provider registry with mock providers for development.
///
/// Every configured provider key is served by the mock IdP, plus a generic
/// `mock` provider.
#[cfg(feature = "mock")]
pub async fn catalog_from_config(config: &AuthConfig) -> Result<ProviderCatalog, AuthError> {
    let mut catalog = ProviderCatalog::new().with(Arc::new(MockProvider::new(
        MOCK_PROVIDER_KEY,
        "Mock",
        config.mock_idp_url.clone(),
    )));

    for provider in &config.providers {
        catalog.register(Arc::new(MockProvider::new(
            &provider.key,
            &provider.name,
            config.mock_idp_url.clone(),
        )));
    }

    tracing::info!(idp = %config.mock_idp_url, "using mock identity providers");
    Ok(catalog)
}
