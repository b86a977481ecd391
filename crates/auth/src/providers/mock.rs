//! Mock provider for development and testing.
//!
//! This module provides a mock implementation of `ProviderClient` that works
//! with the mock IdP server for local development.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use loginbridge_core::provider::{
    denial_from, AuthenticatedIdentity, CallbackParams, ProviderClient, ProviderError,
    ProviderSettings, Result,
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Key of the generic mock provider.
pub const MOCK_PROVIDER_KEY: &str = "mock";

/// User info the mock IdP encodes into its authorization codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MockCode {
    pub provider: String,
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub identifier: Option<String>,
}

impl MockCode {
    pub(crate) fn encode(&self) -> std::result::Result<String, serde_json::Error> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
    }

    pub(crate) fn decode(code: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| ProviderError::Exchange(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Exchange(e.to_string()))
    }
}

/// Mock provider that works with `MockIdpServer`.
///
/// Authorization URLs point at the mock IdP, and authorization codes carry
/// the user info entered on the mock login page. Accepts identifiers, which
/// the mock IdP pre-fills as the user's subject.
pub struct MockProvider {
    key: String,
    name: String,
    mock_idp_url: Url,
}

impl MockProvider {
    /// Create a new MockProvider.
    ///
    /// # Arguments
    /// * `key` - Provider key to register under (e.g. `google`)
    /// * `name` - Name shown on the mock login page
    /// * `mock_idp_url` - The URL of the mock IdP server (e.g. http://localhost:3001)
    pub fn new(key: impl Into<String>, name: impl Into<String>, mock_idp_url: Url) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            mock_idp_url,
        }
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn accepts_identifier(&self) -> bool {
        true
    }

    async fn authorization_url(&self, settings: &ProviderSettings) -> Result<Url> {
        let state = settings
            .state
            .as_deref()
            .ok_or_else(|| ProviderError::Configuration("state was not assigned".to_string()))?;

        let mut url = self
            .mock_idp_url
            .join(&format!("/{}/authorize", self.key))
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("state", state)
            .append_pair("redirect_uri", settings.callback_uri.as_str())
            .append_pair("name", &self.name);

        if let Some(identifier) = &settings.identifier {
            url.query_pairs_mut()
                .append_pair("identifier", identifier.as_str());
        }

        Ok(url)
    }

    async fn exchange(
        &self,
        _settings: &ProviderSettings,
        params: &CallbackParams,
    ) -> Result<AuthenticatedIdentity> {
        if let Some(denied) = denial_from(params) {
            return Err(denied);
        }

        let code = params.code().ok_or(ProviderError::MissingCode)?;
        let decoded = MockCode::decode(code)?;

        if decoded.provider != self.key {
            return Err(ProviderError::Exchange(format!(
                "code was issued for provider '{}'",
                decoded.provider
            )));
        }

        let claims = serde_json::to_value(&decoded).unwrap_or_default();
        let mut identity = AuthenticatedIdentity::new(&self.key, decoded.sub).with_claims(claims);
        identity.email = decoded.email;
        identity.name = decoded.name;

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use loginbridge_core::provider::Identifier;

    use super::*;

    fn provider() -> MockProvider {
        MockProvider::new(
            "google",
            "Google",
            Url::parse("http://localhost:3001").unwrap(),
        )
    }

    fn settings(state: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            provider_key: "google".to_string(),
            provider_name: "Google".to_string(),
            callback_uri: Url::parse("http://localhost:3000/auth/google/callback").unwrap(),
            state: state.map(String::from),
            identifier: None,
        }
    }

    fn code(provider: &str) -> String {
        MockCode {
            provider: provider.to_string(),
            sub: "mock-google-test@example.com".to_string(),
            email: Some("test@example.com".to_string()),
            name: Some("Test User".to_string()),
            identifier: None,
        }
        .encode()
        .unwrap()
    }

    #[tokio::test]
    async fn test_authorization_url() {
        let url = provider()
            .authorization_url(&settings(Some("test-state")))
            .await
            .unwrap();

        assert_eq!(url.path(), "/google/authorize");
        let query = url.query().unwrap();
        assert!(query.contains("state=test-state"));
        assert!(query.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"));
    }

    #[tokio::test]
    async fn test_authorization_url_with_identifier() {
        let mut settings = settings(Some("s"));
        settings.identifier = Some(Identifier::parse("https://id.example/alice").unwrap());

        let url = provider().authorization_url(&settings).await.unwrap();
        assert!(url
            .query()
            .unwrap()
            .contains("identifier=https%3A%2F%2Fid.example%2Falice"));
    }

    #[tokio::test]
    async fn test_authorization_url_requires_state() {
        let result = provider().authorization_url(&settings(None)).await;
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let params: CallbackParams = [("code", code("google")), ("state", "s".to_string())]
            .into_iter()
            .collect();

        let identity = provider()
            .exchange(&settings(None), &params)
            .await
            .unwrap();

        assert_eq!(identity.provider, "google");
        assert_eq!(identity.subject, "mock-google-test@example.com");
        assert_eq!(identity.email, Some("test@example.com".to_string()));
        assert_eq!(identity.name, Some("Test User".to_string()));
    }

    #[tokio::test]
    async fn test_exchange_code_for_other_provider() {
        let params: CallbackParams = [("code", code("apple"))].into_iter().collect();
        let result = provider().exchange(&settings(None), &params).await;
        assert!(matches!(result, Err(ProviderError::Exchange(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_invalid() {
        let params: CallbackParams = [("code", "invalid-code!")].into_iter().collect();
        let result = provider().exchange(&settings(None), &params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_exchange_denied() {
        let params: CallbackParams = [("error", "access_denied")].into_iter().collect();
        let result = provider().exchange(&settings(None), &params).await;
        assert!(matches!(result, Err(ProviderError::Denied { .. })));
    }

    #[tokio::test]
    async fn test_exchange_without_code() {
        let params = CallbackParams::new();
        let result = provider().exchange(&settings(None), &params).await;
        assert_eq!(result.unwrap_err(), ProviderError::MissingCode);
    }
}
