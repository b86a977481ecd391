use async_trait::async_trait;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use loginbridge_core::flow::CallbackResult;

/// Application logic run after a callback was reconciled.
///
/// Receives the result whether or not the identity exchange succeeded, and
/// the cookie jar with the state cookie already cleared.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    async fn handle(&self, result: CallbackResult, jar: CookieJar) -> Response;
}
