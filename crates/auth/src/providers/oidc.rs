//! OpenID Connect provider implementation.

use std::borrow::Cow;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use loginbridge_core::provider::{
    denial_from, AuthenticatedIdentity, CallbackParams, ProviderClient, ProviderError,
    ProviderSettings, Result,
};
use openidconnect::{
    core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata},
    reqwest, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointSet,
    IssuerUrl, Nonce, RedirectUrl, Scope, TokenResponse,
};
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::OidcProviderConfig;

/// Type alias for a CoreClient configured from provider metadata.
///
/// `from_provider_metadata` returns a client with:
/// - HasAuthUrl = EndpointSet (always set from discovery)
/// - HasDeviceAuthUrl = EndpointNotSet
/// - HasIntrospectionUrl = EndpointNotSet
/// - HasRevocationUrl = EndpointNotSet
/// - HasTokenUrl = EndpointMaybeSet (may or may not be in discovery)
/// - HasUserInfoUrl = EndpointMaybeSet (may or may not be in discovery)
type ConfiguredCoreClient = CoreClient<
    EndpointSet,
    openidconnect::EndpointNotSet,
    openidconnect::EndpointNotSet,
    openidconnect::EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// Nonce bound to a state value.
///
/// The ID token must echo the nonce derived from the state that came back on
/// the callback, which ties the token to this login attempt without storing
/// anything server-side.
pub fn nonce_for_state(state: &str) -> Nonce {
    let digest = Sha256::new()
        .chain_update(b"loginbridge.nonce.v1")
        .chain_update(state.as_bytes())
        .finalize();
    Nonce::new(URL_SAFE_NO_PAD.encode(digest))
}

/// OpenID Connect provider discovered from its issuer.
pub struct OidcProvider {
    key: String,
    name: String,
    scopes: Vec<String>,
    client: ConfiguredCoreClient,
    http_client: reqwest::Client,
}

impl OidcProvider {
    /// Create a provider by discovering the OIDC metadata of its issuer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The issuer URL is invalid
    /// - Discovery fails (network error or invalid metadata)
    pub async fn discover(config: &OidcProviderConfig) -> Result<Self> {
        let issuer_url = IssuerUrl::from_url(config.issuer.clone());

        // Build HTTP client without redirect following (security requirement)
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| ProviderError::Discovery(e.to_string()))?;

        // The redirect URI is set per request from the resolved settings.
        let client = CoreClient::from_provider_metadata(
            provider_metadata,
            ClientId::new(config.client_id.clone()),
            config.client_secret.clone().map(ClientSecret::new),
        );

        Ok(Self {
            key: config.key.clone(),
            name: config.name.clone(),
            scopes: config.scopes.clone(),
            client,
            http_client,
        })
    }
}

#[async_trait]
impl ProviderClient for OidcProvider {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn authorization_url(&self, settings: &ProviderSettings) -> Result<Url> {
        let state = settings
            .state
            .clone()
            .ok_or_else(|| ProviderError::Configuration("state was not assigned".to_string()))?;
        let nonce = nonce_for_state(&state);

        let mut request = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                move || CsrfToken::new(state),
                move || nonce,
            )
            .set_redirect_uri(Cow::Owned(RedirectUrl::from_url(
                settings.callback_uri.clone(),
            )));

        for scope in self.scopes.iter().filter(|s| s.as_str() != "openid") {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, _csrf_token, _nonce) = request.url();
        Ok(auth_url)
    }

    async fn exchange(
        &self,
        settings: &ProviderSettings,
        params: &CallbackParams,
    ) -> Result<AuthenticatedIdentity> {
        if let Some(denied) = denial_from(params) {
            return Err(denied);
        }

        let code = params.code().ok_or(ProviderError::MissingCode)?;
        // Validated state of this attempt; the ID token nonce is derived from it.
        let state = settings.state.as_deref().unwrap_or_default();

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| ProviderError::Configuration(e.to_string()))?
            .set_redirect_uri(Cow::Owned(RedirectUrl::from_url(
                settings.callback_uri.clone(),
            )))
            .request_async(&self.http_client)
            .await
            .map_err(|e| ProviderError::Exchange(e.to_string()))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| ProviderError::InvalidToken("No ID token in response".to_string()))?;

        let expected_nonce = nonce_for_state(state);
        let claims = id_token
            .claims(&self.client.id_token_verifier(), &expected_nonce)
            .map_err(|e| ProviderError::InvalidToken(e.to_string()))?;

        let mut identity = AuthenticatedIdentity::new(&self.key, claims.subject().to_string())
            .with_claims(serde_json::to_value(claims).unwrap_or_default());
        identity.email = claims.email().map(|e| e.to_string());
        identity.name = claims
            .name()
            .and_then(|n| n.get(None))
            .map(|n| n.to_string());

        Ok(identity)
    }
}
