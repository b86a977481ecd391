use std::sync::Arc;

use crate::csrf::TokenCodec;
use crate::provider::{ProviderResolver, ResolveError, ResolvedProvider};

use super::{choose_return_target, Initiation, LoginRequest, Result};

/// Builds the outbound redirect of the login leg.
///
/// It has no side effects: persisting the kept token half and sending the
/// redirect are left to the caller.
#[derive(Clone)]
pub struct RedirectInitiator {
    resolver: ProviderResolver,
    codec: Arc<dyn TokenCodec>,
}

impl RedirectInitiator {
    pub fn new(resolver: ProviderResolver, codec: Arc<dyn TokenCodec>) -> Self {
        Self { resolver, codec }
    }

    /// Resolve the provider, mint a token pair bound to the post-login target,
    /// put the sent half in `state` and ask the provider for its
    /// authorization URI.
    ///
    /// # Errors
    ///
    /// - `Resolve(MissingProviderKey)` for a blank provider key
    /// - any other resolver failure
    /// - `Provider` if the client cannot build the authorization URI
    #[tracing::instrument(name = "initiate_login", skip_all, fields(provider = %request.provider_key))]
    pub async fn initiate(&self, request: &LoginRequest) -> Result<Initiation> {
        if request.provider_key.trim().is_empty() {
            return Err(ResolveError::MissingProviderKey.into());
        }

        let ResolvedProvider {
            mut settings,
            client,
        } = self.resolver.resolve(
            &request.provider_key,
            &request.current_url,
            &request.callback_url,
            request.identifier.as_deref(),
        )?;

        let return_target =
            choose_return_target(request.return_url.as_deref(), request.referer_url.as_deref());

        let pair = self.codec.create_token(return_target);
        settings.state = Some(pair.to_send);

        let redirect_uri = client.authorization_url(&settings).await.map_err(|e| {
            tracing::warn!(error = %e, "provider could not build the authorization URL");
            e
        })?;

        tracing::debug!(
            callback = %settings.callback_uri,
            has_return_target = return_target.is_some(),
            has_identifier = settings.identifier.is_some(),
            "login redirect prepared"
        );

        Ok(Initiation {
            redirect_uri,
            token_to_persist: pair.to_keep,
        })
    }
}
