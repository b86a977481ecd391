use thiserror::Error;

/// Result type for provider client operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failures reported by a provider client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider denied the request: {error}")]
    Denied {
        error: String,
        description: Option<String>,
    },

    #[error("provider callback did not include an authorization code")]
    MissingCode,

    #[error("provider discovery failed: {0}")]
    Discovery(String),

    #[error("provider misconfigured: {0}")]
    Configuration(String),

    #[error("failed to exchange authorization code: {0}")]
    Exchange(String),

    #[error("invalid ID token: {0}")]
    InvalidToken(String),
}

/// Failures while resolving provider settings for a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("provider key is missing")]
    MissingProviderKey,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("provider '{0}' does not accept an identifier")]
    IdentifierNotSupported(String),

    #[error("invalid callback URL '{value}': {reason}")]
    InvalidCallbackUrl { value: String, reason: String },
}
