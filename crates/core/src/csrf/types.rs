/// The two halves of an anti-forgery token minted together.
///
/// `to_send` travels through the untrusted channel (the provider `state`
/// parameter). `to_keep` is stored in the trusted client-side store.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub to_send: String,
    pub to_keep: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("to_send", &"<redacted>")
            .field("to_keep", &"<redacted>")
            .finish()
    }
}
