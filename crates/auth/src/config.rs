use std::time::Duration;

use axum_extra::extract::cookie::SameSite;
use base64::{engine::general_purpose::STANDARD, Engine};
use url::Url;

use crate::error::AuthError;

/// Scopes requested from OIDC providers unless configured otherwise.
pub const DEFAULT_SCOPES: &[&str] = &["openid", "email", "profile"];

/// Configuration for one OpenID Connect provider.
#[derive(Debug, Clone)]
pub struct OidcProviderConfig {
    /// Registry key and URL segment, e.g. `google`.
    pub key: String,
    pub name: String,
    pub issuer: Url,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
}

/// Complete auth configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Public base URL; request paths are joined onto it to build the current URL.
    pub base_url: Url,
    pub providers: Vec<OidcProviderConfig>,
    /// Secret for the anti-forgery token codec. A random per-process key is
    /// used when absent.
    pub state_secret: Option<Vec<u8>>,
    pub state_max_age: Duration,
    pub state_cookie_name: String,
    pub state_cookie_same_site: SameSite,
    pub cookie_secure: bool,
    pub strict_identifiers: bool,
    /// Only used with the `mock` feature.
    pub mock_idp_url: Url,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_BASE_URL`: public base URL (default: `http://localhost:3000`)
    /// - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET`: enable Google
    /// - `OIDC_PROVIDERS`: comma separated extra provider keys; each key `K` reads
    ///   `OIDC_<K>_ISSUER`, `OIDC_<K>_CLIENT_ID`, `OIDC_<K>_CLIENT_SECRET`,
    ///   and optionally `OIDC_<K>_NAME` and `OIDC_<K>_SCOPES`
    /// - `LOGINBRIDGE_STATE_SECRET`: base64 secret of at least 32 bytes
    /// - `STATE_TOKEN_MAX_AGE_SECS`: lifetime of a login attempt (default: 600)
    /// - `STATE_COOKIE_NAME`: trusted store cookie (default: `loginbridge_state`)
    /// - `STATE_COOKIE_SAMESITE`: `lax` or `none` (default: `lax`); `none` is
    ///   needed for providers that post the callback form cross-site
    /// - `COOKIE_SECURE`: set the secure flag on cookies (default: true)
    /// - `STRICT_IDENTIFIERS`: reject identifiers for providers without identifier support
    /// - `MOCK_IDP_URL`: mock IdP base URL (default: `http://localhost:3001`)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` for malformed values and partially configured providers.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. See `from_env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = parse_url(
            "AUTH_BASE_URL",
            &var("AUTH_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
        )?;

        let mut providers = Vec::new();

        if let Some(client_id) = var("GOOGLE_CLIENT_ID") {
            let client_secret = var("GOOGLE_CLIENT_SECRET").ok_or_else(|| {
                AuthError::Config("GOOGLE_CLIENT_SECRET is required with GOOGLE_CLIENT_ID".into())
            })?;
            providers.push(OidcProviderConfig {
                key: "google".to_string(),
                name: "Google".to_string(),
                issuer: parse_url("Google issuer", "https://accounts.google.com")?,
                client_id,
                client_secret: Some(client_secret),
                scopes: default_scopes(),
            });
        }

        for key in var("OIDC_PROVIDERS")
            .unwrap_or_default()
            .split(',')
            .map(|k| k.trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
        {
            let prefix = format!("OIDC_{}", key.to_ascii_uppercase().replace('-', "_"));
            let required = |suffix: &str| {
                let name = format!("{prefix}_{suffix}");
                var(&name).ok_or_else(|| AuthError::Config(format!("{name} is required")))
            };

            let issuer_var = format!("{prefix}_ISSUER");
            let issuer = parse_url(&issuer_var, &required("ISSUER")?)?;
            let client_id = required("CLIENT_ID")?;
            let scopes = var(&format!("{prefix}_SCOPES"))
                .map(|s| s.split_whitespace().map(String::from).collect())
                .unwrap_or_else(default_scopes);

            providers.push(OidcProviderConfig {
                name: var(&format!("{prefix}_NAME")).unwrap_or_else(|| key.clone()),
                key,
                issuer,
                client_id,
                client_secret: var(&format!("{prefix}_CLIENT_SECRET")),
                scopes,
            });
        }

        let state_secret = var("LOGINBRIDGE_STATE_SECRET")
            .map(|s| {
                STANDARD.decode(s.trim()).map_err(|e| {
                    AuthError::Config(format!("LOGINBRIDGE_STATE_SECRET is not base64: {e}"))
                })
            })
            .transpose()?;

        let state_max_age = var("STATE_TOKEN_MAX_AGE_SECS")
            .map(|s| {
                s.parse::<u64>().map_err(|e| {
                    AuthError::Config(format!("STATE_TOKEN_MAX_AGE_SECS must be a number: {e}"))
                })
            })
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(600));

        let state_cookie_same_site = match var("STATE_COOKIE_SAMESITE")
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("lax") => SameSite::Lax,
            Some("none") => SameSite::None,
            Some(other) => {
                // Strict never survives the cross-site hop back from the provider.
                return Err(AuthError::Config(format!(
                    "STATE_COOKIE_SAMESITE must be 'lax' or 'none', got '{other}'"
                )));
            }
        };

        let flag = |name: &str, default: bool| {
            var(name)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default)
        };

        Ok(Self {
            base_url,
            providers,
            state_secret,
            state_max_age,
            state_cookie_name: var("STATE_COOKIE_NAME")
                .unwrap_or_else(|| "loginbridge_state".to_string()),
            state_cookie_same_site,
            cookie_secure: flag("COOKIE_SECURE", true),
            strict_identifiers: flag("STRICT_IDENTIFIERS", false),
            mock_idp_url: parse_url(
                "MOCK_IDP_URL",
                &var("MOCK_IDP_URL").unwrap_or_else(|| "http://localhost:3001".to_string()),
            )?,
        })
    }

    /// Callback route for a provider; identical on both legs of a login.
    pub fn callback_path(provider_key: &str) -> String {
        format!("/auth/{provider_key}/callback")
    }

    /// Login route for a provider.
    pub fn login_path(provider_key: &str) -> String {
        format!("/auth/{provider_key}/login")
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url.as_str())
            .field("providers", &self.providers)
            .field("state_secret", &self.state_secret.as_ref().map(|_| "<redacted>"))
            .field("state_max_age", &self.state_max_age)
            .field("state_cookie_name", &self.state_cookie_name)
            .field("state_cookie_same_site", &self.state_cookie_same_site)
            .field("cookie_secure", &self.cookie_secure)
            .field("strict_identifiers", &self.strict_identifiers)
            .field("mock_idp_url", &self.mock_idp_url.as_str())
            .finish()
    }
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn parse_url(name: &str, value: &str) -> Result<Url, AuthError> {
    Url::parse(value).map_err(|e| AuthError::Config(format!("{name} must be a valid URL: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AuthConfig, AuthError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AuthConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:3000/");
        assert!(config.providers.is_empty());
        assert!(config.state_secret.is_none());
        assert_eq!(config.state_max_age, Duration::from_secs(600));
        assert_eq!(config.state_cookie_name, "loginbridge_state");
        assert_eq!(config.state_cookie_same_site, SameSite::Lax);
        assert!(config.cookie_secure);
        assert!(!config.strict_identifiers);
        assert_eq!(config.mock_idp_url.as_str(), "http://localhost:3001/");
    }

    #[test]
    fn test_google_requires_secret() {
        let err = load(&[("GOOGLE_CLIENT_ID", "id")]).unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));

        let config = load(&[("GOOGLE_CLIENT_ID", "id"), ("GOOGLE_CLIENT_SECRET", "secret")])
            .unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].key, "google");
        assert_eq!(
            config.providers[0].issuer.as_str(),
            "https://accounts.google.com/"
        );
        assert_eq!(config.providers[0].scopes, vec!["openid", "email", "profile"]);
    }

    #[test]
    fn test_extra_oidc_providers() {
        let config = load(&[
            ("OIDC_PROVIDERS", "Keycloak, gitlab-sso"),
            ("OIDC_KEYCLOAK_ISSUER", "https://sso.example/realms/main"),
            ("OIDC_KEYCLOAK_CLIENT_ID", "kc"),
            ("OIDC_KEYCLOAK_NAME", "Company SSO"),
            ("OIDC_GITLAB_SSO_ISSUER", "https://gitlab.example"),
            ("OIDC_GITLAB_SSO_CLIENT_ID", "gl"),
            ("OIDC_GITLAB_SSO_SCOPES", "openid email"),
        ])
        .unwrap();

        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].key, "keycloak");
        assert_eq!(config.providers[0].name, "Company SSO");
        assert_eq!(config.providers[0].client_secret, None);
        assert_eq!(config.providers[1].key, "gitlab-sso");
        assert_eq!(config.providers[1].name, "gitlab-sso");
        assert_eq!(config.providers[1].scopes, vec!["openid", "email"]);
    }

    #[test]
    fn test_extra_provider_requires_issuer() {
        let err = load(&[("OIDC_PROVIDERS", "corp"), ("OIDC_CORP_CLIENT_ID", "x")]).unwrap_err();
        assert!(err.to_string().contains("OIDC_CORP_ISSUER"));
    }

    #[test]
    fn test_state_secret_must_be_base64() {
        assert!(load(&[("LOGINBRIDGE_STATE_SECRET", "%%%")]).is_err());

        let secret = STANDARD.encode([9u8; 32]);
        let config = load(&[("LOGINBRIDGE_STATE_SECRET", &secret)]).unwrap();
        assert_eq!(config.state_secret, Some(vec![9u8; 32]));
    }

    #[test]
    fn test_same_site_values() {
        let config = load(&[("STATE_COOKIE_SAMESITE", "None")]).unwrap();
        assert_eq!(config.state_cookie_same_site, SameSite::None);
        assert!(load(&[("STATE_COOKIE_SAMESITE", "strict")]).is_err());
    }

    #[test]
    fn test_flags_and_max_age() {
        let config = load(&[
            ("COOKIE_SECURE", "false"),
            ("STRICT_IDENTIFIERS", "1"),
            ("STATE_TOKEN_MAX_AGE_SECS", "120"),
        ])
        .unwrap();

        assert!(!config.cookie_secure);
        assert!(config.strict_identifiers);
        assert_eq!(config.state_max_age, Duration::from_secs(120));
        assert!(load(&[("STATE_TOKEN_MAX_AGE_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let secret = STANDARD.encode([9u8; 32]);
        let config = load(&[("LOGINBRIDGE_STATE_SECRET", &secret)]).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("9, 9"));
    }

    #[test]
    fn test_routes() {
        assert_eq!(AuthConfig::callback_path("google"), "/auth/google/callback");
        assert_eq!(AuthConfig::login_path("google"), "/auth/google/login");
    }
}
