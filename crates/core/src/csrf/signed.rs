//! HMAC-SHA256 split token.
//!
//! The sent half is a random nonce. The kept half is
//! `iat (8 bytes, big endian) || tag (32 bytes) || extra data`, where
//! `tag = HMAC(key, DOMAIN_TAG || nonce || iat || extra)`. Both halves are
//! base64url without padding so they survive query strings and cookies untouched.
//!
//! Without the key, neither half can be derived from the other, and a kept
//! half only verifies against the nonce it was minted with.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use super::{Result, TokenCodec, TokenError, TokenPair};

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted key length in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Default lifetime of a minted pair (10 minutes).
pub const DEFAULT_MAX_AGE_SECS: i64 = 600;

const DOMAIN_TAG: &[u8] = b"loginbridge.state.v1";
const NONCE_LEN: usize = 32;
const IAT_LEN: usize = 8;
const TAG_LEN: usize = 32;

/// Default `TokenCodec` backed by a server-side HMAC key.
#[derive(Clone)]
pub struct HmacTokenCodec {
    mac: HmacSha256,
    max_age: Duration,
}

impl HmacTokenCodec {
    /// Create a codec from a secret key.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the key is shorter than `MIN_KEY_LEN`.
    pub fn new(key: &[u8]) -> Result<Self> {
        let invalid = || TokenError::InvalidKey {
            min: MIN_KEY_LEN,
            actual: key.len(),
        };

        if key.len() < MIN_KEY_LEN {
            return Err(invalid());
        }

        let mac = HmacSha256::new_from_slice(key).map_err(|_| invalid())?;

        Ok(Self {
            mac,
            max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
        })
    }

    /// Create a codec with a fresh random key.
    ///
    /// Pairs minted by this codec only validate within the same process.
    pub fn random() -> Result<Self> {
        let mut key = [0u8; 64];
        rand::rng().fill(&mut key[..]);
        Self::new(&key)
    }

    /// Override how long a minted pair stays valid.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Mint a pair as of `now`.
    pub fn create_token_at(&self, extra_data: Option<&str>, now: DateTime<Utc>) -> TokenPair {
        let extra = extra_data.unwrap_or_default().as_bytes();
        let nonce: [u8; NONCE_LEN] = rand::random();
        let iat = now.timestamp();

        let tag = self.tag(&nonce, iat, extra);

        let mut kept = Vec::with_capacity(IAT_LEN + TAG_LEN + extra.len());
        kept.extend_from_slice(&iat.to_be_bytes());
        kept.extend_from_slice(&tag);
        kept.extend_from_slice(extra);

        TokenPair {
            to_send: URL_SAFE_NO_PAD.encode(nonce),
            to_keep: URL_SAFE_NO_PAD.encode(kept),
        }
    }

    /// Validate a pair as of `now`.
    pub fn validate_token_at(
        &self,
        kept: Option<&str>,
        received: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        let kept = kept
            .filter(|k| !k.is_empty())
            .ok_or(TokenError::MissingKeptToken)?;

        if received.is_empty() {
            return Err(TokenError::MissingReceivedToken);
        }

        // The received half came through the provider; anything that is not
        // one of our nonces is simply the wrong half.
        let nonce = URL_SAFE_NO_PAD
            .decode(received)
            .map_err(|_| TokenError::Mismatch)?;
        if nonce.len() != NONCE_LEN {
            return Err(TokenError::Mismatch);
        }

        let raw = URL_SAFE_NO_PAD
            .decode(kept)
            .map_err(|_| TokenError::Malformed)?;
        if raw.len() < IAT_LEN + TAG_LEN {
            return Err(TokenError::Malformed);
        }

        let (iat_bytes, rest) = raw.split_at(IAT_LEN);
        let (tag, extra) = rest.split_at(TAG_LEN);
        let iat = i64::from_be_bytes(iat_bytes.try_into().map_err(|_| TokenError::Malformed)?);

        let mut mac = self.mac.clone();
        Self::feed(&mut mac, &nonce, iat, extra);
        mac.verify_slice(tag).map_err(|_| TokenError::Mismatch)?;

        if now.timestamp().saturating_sub(iat) > self.max_age.num_seconds() {
            return Err(TokenError::Expired);
        }

        let extra = String::from_utf8(extra.to_vec()).map_err(|_| TokenError::Malformed)?;
        Ok(Some(extra).filter(|e| !e.is_empty()))
    }

    fn tag(&self, nonce: &[u8], iat: i64, extra: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        Self::feed(&mut mac, nonce, iat, extra);
        mac.finalize().into_bytes().to_vec()
    }

    fn feed(mac: &mut HmacSha256, nonce: &[u8], iat: i64, extra: &[u8]) {
        mac.update(DOMAIN_TAG);
        mac.update(nonce);
        mac.update(&iat.to_be_bytes());
        mac.update(extra);
    }
}

impl TokenCodec for HmacTokenCodec {
    fn create_token(&self, extra_data: Option<&str>) -> TokenPair {
        self.create_token_at(extra_data, Utc::now())
    }

    fn validate_token(&self, kept: Option<&str>, received: &str) -> Result<Option<String>> {
        self.validate_token_at(kept, received, Utc::now())
    }
}

impl std::fmt::Debug for HmacTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenCodec")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}
