use thiserror::Error;

use crate::csrf::TokenError;
use crate::provider::{ProviderError, ResolveError};

/// Result type for the login and callback legs.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Fatal failures of the login or callback leg.
///
/// Identity exchange failures on the callback leg are not in here: they are
/// carried in `CallbackResult::failure` so the application can render them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("provider did not return the state parameter")]
    MissingState,

    #[error("anti-forgery validation failed: {0}")]
    CsrfValidationFailed(#[source] TokenError),

    #[error("invalid redirect data '{value}': {reason}")]
    InvalidRedirectData { value: String, reason: String },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl FlowError {
    /// Malformed or tampered request input, as opposed to forgery or defects.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Resolve(_) | Self::MissingState)
    }
}
