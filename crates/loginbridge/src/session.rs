//! Demo application logic run after a callback.
//!
//! A successful login stores a display cookie and sends the user back to
//! where they started. The cookie is not a session: it only carries what the
//! index page shows.

use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use loginbridge_auth::CallbackHandler;
use loginbridge_core::flow::{is_local_redirect, CallbackResult};
use loginbridge_core::provider::{AuthenticatedIdentity, ProviderError};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::pages;

/// Name of the display cookie.
pub const USER_COOKIE: &str = "loginbridge_user";

/// Signed-in user as shown on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub provider: String,
    pub subject: String,
    pub display_name: String,
}

impl SignedInUser {
    pub fn from_identity(identity: &AuthenticatedIdentity) -> Self {
        Self {
            provider: identity.provider.clone(),
            subject: identity.subject.clone(),
            display_name: identity.display_name(),
        }
    }

    /// Cookie-safe encoding (base64url JSON).
    pub fn to_cookie_value(&self) -> Result<String, serde_json::Error> {
        serde_json::to_vec(self).map(|json| URL_SAFE_NO_PAD.encode(json))
    }

    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let json = URL_SAFE_NO_PAD.decode(value).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Read the user from the display cookie, if present and well-formed.
    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        jar.get(USER_COOKIE)
            .and_then(|c| Self::from_cookie_value(c.value()))
    }
}

/// Cookie jar without the display cookie.
pub fn sign_out(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(USER_COOKIE).path("/"))
}

/// `CallbackHandler` for the demo app.
pub struct SessionGreeting {
    base_url: Url,
    secure: bool,
}

impl SessionGreeting {
    pub fn new(base_url: Url, secure: bool) -> Self {
        Self { base_url, secure }
    }

    /// Post-login target; anything off-origin falls back to the index page.
    fn landing(&self, redirect_url: Option<Url>) -> String {
        match redirect_url {
            Some(url) if is_local_redirect(&url, &self.base_url) => url.into(),
            Some(url) => {
                tracing::warn!(target_url = %url, "refusing off-origin post-login redirect");
                "/".to_string()
            }
            None => "/".to_string(),
        }
    }

    fn user_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((USER_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

#[async_trait]
impl CallbackHandler for SessionGreeting {
    async fn handle(&self, result: CallbackResult, jar: CookieJar) -> Response {
        let CallbackResult {
            provider_key,
            identity,
            failure,
            redirect_url,
        } = result;

        let Some(identity) = identity else {
            let failure = failure
                .unwrap_or_else(|| ProviderError::Exchange("no identity returned".into()));
            tracing::warn!(provider = %provider_key, error = %failure, "login failed");
            return (
                StatusCode::UNAUTHORIZED,
                jar,
                pages::login_failed(&provider_key, &failure),
            )
                .into_response();
        };

        let user = SignedInUser::from_identity(&identity);
        let value = match user.to_cookie_value() {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode user cookie");
                return (StatusCode::INTERNAL_SERVER_ERROR, jar, "Something went wrong")
                    .into_response();
            }
        };

        tracing::info!(
            provider = %identity.provider,
            subject = %identity.subject,
            "user signed in"
        );

        let target = self.landing(redirect_url);
        (jar.add(self.user_cookie(value)), Redirect::to(&target)).into_response()
    }
}
