mod error;
mod signed;
mod traits;
mod types;

pub use error::{Result, TokenError};
pub use signed::{HmacTokenCodec, DEFAULT_MAX_AGE_SECS, MIN_KEY_LEN};
pub use traits::TokenCodec;
pub use types::TokenPair;
