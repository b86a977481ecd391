use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::ResolveError;

/// Base used only to check that a relative identifier is a well-formed reference.
const RELATIVE_CHECK_BASE: &str = "http://identifier.invalid/";

/// Connection settings for one provider, built per request.
///
/// `state` carries the sent token half. The login leg assigns the freshly
/// minted half before building the authorization URI. The callback leg
/// rebuilds the settings from the same provider key and callback URL and
/// assigns the validated received half before the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider_key: String,
    pub provider_name: String,
    /// Absolute callback URI. Must be identical on both legs.
    pub callback_uri: Url,
    pub state: Option<String>,
    /// Only set for providers that accept a user-supplied identifier.
    pub identifier: Option<Identifier>,
}

/// User-supplied identifier for identifier-based protocols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Absolute(Url),
    /// A relative reference such as `me.example.org` or `/users/alice`.
    Relative(String),
}

impl Identifier {
    /// Parse an absolute or relative URI reference.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidIdentifier` for blank values, values with
    /// whitespace or control characters, and anything `url` cannot parse.
    pub fn parse(value: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: &str| ResolveError::InvalidIdentifier {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty identifier"));
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(invalid("identifier contains whitespace or control characters"));
        }

        match Url::parse(trimmed) {
            Ok(url) => Ok(Self::Absolute(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse(RELATIVE_CHECK_BASE).map_err(|e| invalid(&e.to_string()))?;
                base.join(trimmed).map_err(|e| invalid(&e.to_string()))?;
                Ok(Self::Relative(trimmed.to_string()))
            }
            Err(e) => Err(invalid(&e.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Absolute(url) => url.as_str(),
            Self::Relative(value) => value,
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Self::Absolute(_))
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw parameters the provider sent back to the callback, from either the
/// query string or a form body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackParams(BTreeMap<String, String>);

impl CallbackParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the query pairs of a callback URL.
    pub fn from_url(url: &Url) -> Self {
        url.query_pairs().collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value for `key`, treating empty values as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    pub fn error(&self) -> Option<&str> {
        self.get("error")
    }

    pub fn error_description(&self) -> Option<&str> {
        self.get("error_description")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for CallbackParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Identity returned by a provider after a successful exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    /// Key of the provider that authenticated the user.
    pub provider: String,
    /// Provider's unique user identifier.
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Provider-specific claims, opaque to this crate.
    #[serde(default)]
    pub claims: serde_json::Value,
}

impl AuthenticatedIdentity {
    pub fn new(provider: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            subject: subject.into(),
            email: None,
            name: None,
            claims: serde_json::Value::Null,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_claims(mut self, claims: serde_json::Value) -> Self {
        self.claims = claims;
        self
    }

    /// Name to show the user: the display name, else the email local part,
    /// else the subject.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }

        match self.email.as_deref().and_then(|e| e.split('@').next()) {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => self.subject.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_parses_absolute_uri() {
        let id = Identifier::parse("https://openid.example.org/alice").unwrap();
        assert!(id.is_absolute());
        assert_eq!(id.as_str(), "https://openid.example.org/alice");
    }

    #[test]
    fn identifier_parses_relative_reference() {
        let id = Identifier::parse("me.example.org").unwrap();
        assert_eq!(id, Identifier::Relative("me.example.org".to_string()));

        let id = Identifier::parse(" /users/alice ").unwrap();
        assert_eq!(id.as_str(), "/users/alice");
    }

    #[test]
    fn identifier_rejects_malformed_values() {
        for value in ["", "   ", "has space.example", "http://[::1", "https://exa mple.org"] {
            let err = Identifier::parse(value).unwrap_err();
            assert!(
                matches!(err, ResolveError::InvalidIdentifier { .. }),
                "{value:?} should be invalid"
            );
        }
    }

    #[test]
    fn callback_params_from_url() {
        let url = Url::parse("https://app.example/cb?code=abc&state=xyz&empty=").unwrap();
        let params = CallbackParams::from_url(&url);

        assert_eq!(params.code(), Some("abc"));
        assert_eq!(params.state(), Some("xyz"));
        assert_eq!(params.get("empty"), None);
        assert_eq!(params.error(), None);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn callback_params_deserialize_from_map() {
        let params: CallbackParams =
            serde_json::from_str(r#"{"code":"c","state":"s"}"#).unwrap();
        assert_eq!(params.code(), Some("c"));
        assert_eq!(params.state(), Some("s"));
    }

    #[test]
    fn display_name_prefers_name_then_email() {
        let identity = AuthenticatedIdentity::new("google", "sub-1");
        assert_eq!(identity.display_name(), "sub-1");

        let identity = identity.with_email("alice@example.com");
        assert_eq!(identity.display_name(), "alice");

        let identity = identity.with_name("Alice Doe");
        assert_eq!(identity.display_name(), "Alice Doe");
    }
}
