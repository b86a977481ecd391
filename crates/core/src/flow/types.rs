use url::Url;

use crate::provider::{AuthenticatedIdentity, CallbackParams, ProviderError};

/// Input of the login leg.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub provider_key: String,
    /// Identifier for identifier-based protocols.
    pub identifier: Option<String>,
    /// Full URL of the request being served.
    pub current_url: Url,
    /// Callback route, absolute or relative to `current_url`.
    pub callback_url: String,
    pub referer_url: Option<String>,
    /// Explicit post-login target; wins over the referer.
    pub return_url: Option<String>,
}

impl LoginRequest {
    pub fn new(
        provider_key: impl Into<String>,
        current_url: Url,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            provider_key: provider_key.into(),
            identifier: None,
            current_url,
            callback_url: callback_url.into(),
            referer_url: None,
            return_url: None,
        }
    }

    pub fn with_identifier(mut self, identifier: Option<String>) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer_url = referer;
        self
    }

    pub fn with_return_url(mut self, return_url: Option<String>) -> Self {
        self.return_url = return_url;
        self
    }
}

/// Output of the login leg.
///
/// The caller must persist `token_to_persist` in the trusted store before
/// sending the user to `redirect_uri`.
#[derive(Clone)]
pub struct Initiation {
    pub redirect_uri: Url,
    pub token_to_persist: String,
}

impl std::fmt::Debug for Initiation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Initiation")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("token_to_persist", &"<redacted>")
            .finish()
    }
}

/// Input of the callback leg.
#[derive(Clone)]
pub struct CallbackRequest {
    pub provider_key: String,
    /// Full URL of the callback request.
    pub current_url: Url,
    /// Same callback route that was used on the login leg.
    pub callback_url: String,
    /// Half read from the trusted store.
    pub kept_token: Option<String>,
    /// Half echoed by the provider in `state`.
    pub received_token: Option<String>,
    pub params: CallbackParams,
}

impl CallbackRequest {
    /// Build a request whose received token is the `state` callback parameter.
    pub fn new(
        provider_key: impl Into<String>,
        current_url: Url,
        callback_url: impl Into<String>,
        params: CallbackParams,
    ) -> Self {
        Self {
            provider_key: provider_key.into(),
            current_url,
            callback_url: callback_url.into(),
            kept_token: None,
            received_token: params.state().map(String::from),
            params,
        }
    }

    pub fn with_kept_token(mut self, kept_token: Option<String>) -> Self {
        self.kept_token = kept_token;
        self
    }

    pub fn with_received_token(mut self, received_token: Option<String>) -> Self {
        self.received_token = received_token;
        self
    }
}

impl std::fmt::Debug for CallbackRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRequest")
            .field("provider_key", &self.provider_key)
            .field("current_url", &self.current_url.as_str())
            .field("callback_url", &self.callback_url)
            .field("has_kept_token", &self.kept_token.is_some())
            .field("has_received_token", &self.received_token.is_some())
            .finish_non_exhaustive()
    }
}

/// What the application receives after a callback was reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackResult {
    pub provider_key: String,
    pub identity: Option<AuthenticatedIdentity>,
    /// Why the identity exchange failed, if it did.
    pub failure: Option<ProviderError>,
    /// Post-login target bound into the token pair on the login leg.
    pub redirect_url: Option<Url>,
}

impl CallbackResult {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
