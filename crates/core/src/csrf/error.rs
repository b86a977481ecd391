use thiserror::Error;

/// Result type for anti-forgery token operations.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Reasons a kept/received token pair fails to validate.
///
/// Every variant other than `InvalidKey` is a token mismatch from the point of
/// view of the callback leg.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("anti-forgery token missing from the trusted store")]
    MissingKeptToken,

    #[error("anti-forgery token missing from the provider response")]
    MissingReceivedToken,

    #[error("anti-forgery token pair does not match")]
    Mismatch,

    #[error("malformed anti-forgery token")]
    Malformed,

    #[error("anti-forgery token expired")]
    Expired,

    #[error("anti-forgery key must be at least {min} bytes, got {actual}")]
    InvalidKey { min: usize, actual: usize },
}

impl TokenError {
    /// True when one of the two halves was not supplied at all.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingKeptToken | Self::MissingReceivedToken)
    }
}
