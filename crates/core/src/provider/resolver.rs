use std::sync::Arc;

use url::Url;

use super::{normalize_key, Identifier, ProviderClient, ProviderRegistry, ProviderSettings, ResolveError};

/// Settings for one request together with the client that owns them.
#[derive(Clone)]
pub struct ResolvedProvider {
    pub settings: ProviderSettings,
    pub client: Arc<dyn ProviderClient>,
}

impl std::fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Maps a provider key to per-request `ProviderSettings`.
#[derive(Clone)]
pub struct ProviderResolver {
    registry: Arc<dyn ProviderRegistry>,
    strict_identifiers: bool,
}

impl ProviderResolver {
    pub fn new(registry: Arc<dyn ProviderRegistry>) -> Self {
        Self {
            registry,
            strict_identifiers: false,
        }
    }

    /// Reject identifiers sent to providers that do not accept one, instead of
    /// ignoring them.
    pub fn with_strict_identifiers(mut self, strict: bool) -> Self {
        self.strict_identifiers = strict;
        self
    }

    pub fn registry(&self) -> &Arc<dyn ProviderRegistry> {
        &self.registry
    }

    /// Resolve settings for `provider_key`.
    ///
    /// `callback_url` may be relative to `current_url`. Both legs of a login
    /// must pass the same values so the provider sees the same callback URI.
    ///
    /// # Errors
    ///
    /// - `MissingProviderKey` for a blank key
    /// - `UnknownProvider` when no client is registered under the key
    /// - `InvalidCallbackUrl` when the callback cannot be made absolute
    /// - `InvalidIdentifier` when a supported identifier is not a URI reference
    /// - `IdentifierNotSupported` in strict mode only
    pub fn resolve(
        &self,
        provider_key: &str,
        current_url: &Url,
        callback_url: &str,
        identifier: Option<&str>,
    ) -> Result<ResolvedProvider, ResolveError> {
        let key = normalize_key(provider_key).ok_or(ResolveError::MissingProviderKey)?;

        let client = self
            .registry
            .client(&key)
            .ok_or_else(|| ResolveError::UnknownProvider(key.clone()))?;

        let callback_uri = absolute_callback(current_url, callback_url)?;

        let identifier = match identifier.filter(|i| !i.trim().is_empty()) {
            None => None,
            Some(raw) if client.accepts_identifier() => Some(Identifier::parse(raw)?),
            Some(_) if self.strict_identifiers => {
                return Err(ResolveError::IdentifierNotSupported(key));
            }
            Some(_) => {
                tracing::debug!(provider = %key, "ignoring identifier for provider without identifier support");
                None
            }
        };

        Ok(ResolvedProvider {
            settings: ProviderSettings {
                provider_key: key,
                provider_name: client.name().to_string(),
                callback_uri,
                state: None,
                identifier,
            },
            client,
        })
    }
}

fn absolute_callback(current_url: &Url, callback_url: &str) -> Result<Url, ResolveError> {
    let invalid = |reason: String| ResolveError::InvalidCallbackUrl {
        value: callback_url.to_string(),
        reason,
    };

    if callback_url.trim().is_empty() {
        return Err(invalid("empty callback URL".to_string()));
    }

    let mut url = current_url
        .join(callback_url.trim())
        .map_err(|e| invalid(e.to_string()))?;

    // The provider compares redirect URIs verbatim; fragments never reach it.
    url.set_fragment(None);
    Ok(url)
}
