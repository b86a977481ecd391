use super::{Result, TokenPair};

/// Creates and validates split anti-forgery tokens.
pub trait TokenCodec: Send + Sync {
    /// Mint a new pair carrying `extra_data`. Empty extra data is treated as none.
    fn create_token(&self, extra_data: Option<&str>) -> TokenPair;

    /// Check that `kept` and `received` were minted together and return the
    /// extra data bound into the pair.
    fn validate_token(&self, kept: Option<&str>, received: &str) -> Result<Option<String>>;
}
