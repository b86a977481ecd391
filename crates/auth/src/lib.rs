//! HTTP shell for loginbridge.
//!
//! This crate provides:
//! - OpenID Connect provider clients discovered from their issuer
//! - The split-token state cookie and axum login/callback routes
//! - A mock provider and mock IdP server for development (`mock` feature)

mod callback;
mod config;
mod cookie;
mod error;
mod handlers;
mod providers;
mod state;

pub use callback::CallbackHandler;
pub use config::{AuthConfig, OidcProviderConfig, DEFAULT_SCOPES};
pub use cookie::{StateCookie, STATE_COOKIE_PATH};
pub use error::AuthError;
pub use handlers::{auth_routes, LoginQuery};
pub use providers::{catalog_from_config, nonce_for_state, OidcProvider};
#[cfg(feature = "mock")]
pub use providers::{MockProvider, MOCK_PROVIDER_KEY};
pub use state::{codec_from_config, AuthState};

#[cfg(feature = "mock")]
pub mod mock_idp;
