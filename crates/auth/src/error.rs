use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use loginbridge_core::flow::FlowError;
use loginbridge_core::provider::ResolveError;
use thiserror::Error;

/// Auth errors for the loginbridge_auth crate.
///
/// This wraps the core `FlowError` and adds the failures of the I/O shell.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the login or callback leg
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// The incoming request could not be turned into a flow input
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// HTTP status the error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Flow(flow) => match flow {
                FlowError::Resolve(ResolveError::UnknownProvider(_)) => StatusCode::NOT_FOUND,
                FlowError::Resolve(_) | FlowError::MissingState => StatusCode::BAD_REQUEST,
                FlowError::CsrfValidationFailed(_) => StatusCode::FORBIDDEN,
                FlowError::Provider(_) => StatusCode::BAD_GATEWAY,
                FlowError::InvalidRedirectData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AuthError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AuthError::Flow(FlowError::CsrfValidationFailed(reason)) => {
                tracing::error!(%reason, "rejected callback: possible request forgery");
                "Login request could not be verified, please try again".to_string()
            }
            AuthError::Flow(FlowError::InvalidRedirectData { .. }) => {
                tracing::error!("Auth error: {}", self);
                "Internal server error".to_string()
            }
            AuthError::Flow(FlowError::Provider(_)) => {
                tracing::error!("Provider error during login: {}", self);
                "Authentication provider error".to_string()
            }
            AuthError::Config(_) => {
                tracing::error!("Config error: {}", self);
                "Server configuration error".to_string()
            }
            AuthError::Flow(_) | AuthError::InvalidRequest(_) => {
                tracing::debug!("Rejected auth request: {}", self);
                self.to_string()
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use loginbridge_core::csrf::TokenError;
    use loginbridge_core::provider::ProviderError;

    use super::*;

    #[test]
    fn status_codes_follow_error_category() {
        let cases = [
            (
                AuthError::from(FlowError::from(ResolveError::MissingProviderKey)),
                StatusCode::BAD_REQUEST,
            ),
            (
                AuthError::from(FlowError::from(ResolveError::UnknownProvider("x".into()))),
                StatusCode::NOT_FOUND,
            ),
            (AuthError::from(FlowError::MissingState), StatusCode::BAD_REQUEST),
            (
                AuthError::from(FlowError::CsrfValidationFailed(TokenError::Mismatch)),
                StatusCode::FORBIDDEN,
            ),
            (
                AuthError::from(FlowError::from(ProviderError::Discovery("down".into()))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AuthError::from(FlowError::InvalidRedirectData {
                    value: "x".into(),
                    reason: "y".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AuthError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (AuthError::Config("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{error}");
        }
    }

    #[test]
    fn csrf_failure_does_not_leak_details() {
        let response =
            AuthError::from(FlowError::CsrfValidationFailed(TokenError::Expired)).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
