//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::Uri;
use chrono::Duration;
use loginbridge_core::csrf::{HmacTokenCodec, TokenCodec};
use loginbridge_core::flow::{CallbackReconciler, RedirectInitiator};
use loginbridge_core::provider::{ProviderRegistry, ProviderResolver};
use url::Url;

use crate::callback::CallbackHandler;
use crate::config::AuthConfig;
use crate::cookie::StateCookie;
use crate::error::AuthError;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub initiator: RedirectInitiator,
    pub reconciler: CallbackReconciler,
    pub state_cookie: StateCookie,
    pub registry: Arc<dyn ProviderRegistry>,
    pub handler: Arc<dyn CallbackHandler>,
    pub config: AuthConfig,
}

impl AuthState {
    /// Wire the login and callback legs around one registry and one codec.
    pub fn new(
        config: AuthConfig,
        registry: Arc<dyn ProviderRegistry>,
        codec: Arc<dyn TokenCodec>,
        handler: Arc<dyn CallbackHandler>,
    ) -> Self {
        let resolver =
            ProviderResolver::new(registry.clone()).with_strict_identifiers(config.strict_identifiers);

        let state_cookie = StateCookie::new(
            config.state_cookie_name.clone(),
            config.cookie_secure,
            config.state_cookie_same_site,
            config.state_max_age,
        );

        Self {
            initiator: RedirectInitiator::new(resolver.clone(), codec.clone()),
            reconciler: CallbackReconciler::new(resolver, codec),
            state_cookie,
            registry,
            handler,
            config,
        }
    }

    /// Absolute URL of the request being served, rooted at the public base URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the request target cannot be joined onto the base URL.
    pub fn current_url(&self, uri: &Uri) -> Result<Url, AuthError> {
        let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        self.config
            .base_url
            .join(target)
            .map_err(|e| AuthError::InvalidRequest(format!("invalid request target: {e}")))
    }
}

/// Build the default token codec from configuration.
///
/// Without a configured secret a random key is generated; login attempts then
/// only complete on the instance that started them.
///
/// # Errors
///
/// Returns `AuthError::Config` if the configured secret is too short or the
/// max age is zero or out of range.
pub fn codec_from_config(config: &AuthConfig) -> Result<HmacTokenCodec, AuthError> {
    let codec = match &config.state_secret {
        Some(secret) => HmacTokenCodec::new(secret),
        None => {
            tracing::warn!(
                "LOGINBRIDGE_STATE_SECRET not set, using a random key; \
                 multi-instance deployments need a shared secret"
            );
            HmacTokenCodec::random()
        }
    }
    .map_err(|e| AuthError::Config(format!("state secret: {e}")))?;

    let secs = config.state_max_age.as_secs();
    if secs == 0 {
        // A zero lifetime also gives the state cookie `Max-Age=0`.
        return Err(AuthError::Config(
            "state token max age must be at least one second".to_string(),
        ));
    }
    let max_age = i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| AuthError::Config("state token max age is too large".to_string()))?;

    Ok(codec.with_max_age(max_age))
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
