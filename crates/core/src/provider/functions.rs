use super::{CallbackParams, ProviderError};

/// Canonical form of a provider key: trimmed and lowercased.
///
/// Returns `None` for an empty key.
pub fn normalize_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_ascii_lowercase())
    }
}

/// Provider-reported denial (`error=...`) carried in callback parameters.
pub fn denial_from(params: &CallbackParams) -> Option<ProviderError> {
    params.error().map(|error| ProviderError::Denied {
        error: error.to_string(),
        description: params.error_description().map(String::from),
    })
}
