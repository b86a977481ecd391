//! HTTP handlers for auth routes.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header::REFERER, HeaderMap, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::CookieJar;
use loginbridge_core::flow::{CallbackRequest, LoginRequest};
use loginbridge_core::provider::{normalize_key, CallbackParams};
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::AuthState;

/// Query parameters for login endpoints.
#[derive(Deserialize, Default)]
pub struct LoginQuery {
    /// URL to redirect to after authentication; wins over the Referer header.
    pub return_url: Option<String>,
    /// Identifier for providers that accept one.
    pub identifier: Option<String>,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /auth/{provider}/login` - Start the provider redirect
/// - `GET /auth/{provider}/callback` - Handle a query-string callback
/// - `POST /auth/{provider}/callback` - Handle a form-post callback
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/{provider}/login", get(login))
        .route(
            "/auth/{provider}/callback",
            get(callback_query).post(callback_form),
        )
}

async fn login(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(query): Query<LoginQuery>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    let current_url = state.current_url(&uri)?;

    let referer = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let request = LoginRequest::new(&provider, current_url, callback_path(&provider))
        .with_identifier(query.identifier)
        .with_referer(referer)
        .with_return_url(query.return_url);

    let initiation = state.initiator.initiate(&request).await?;

    // The kept half must be on its way to the browser together with the redirect.
    let jar = state.state_cookie.put(jar, initiation.token_to_persist);
    Ok((jar, Redirect::to(initiation.redirect_uri.as_str())))
}

async fn callback_query(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    handle_callback(&state, &provider, &uri, params, jar).await
}

/// Providers using `response_mode=form_post` send the callback as a form POST.
async fn callback_form(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    OriginalUri(uri): OriginalUri,
    jar: CookieJar,
    Form(params): Form<CallbackParams>,
) -> Response {
    handle_callback(&state, &provider, &uri, params, jar).await
}

async fn handle_callback(
    state: &AuthState,
    provider: &str,
    uri: &Uri,
    params: CallbackParams,
    jar: CookieJar,
) -> Response {
    let kept = state.state_cookie.get(&jar);
    // One-time use, whatever the outcome.
    let jar = state.state_cookie.invalidate(jar);

    let reconciled = async {
        let current_url = state.current_url(uri)?;
        let request = CallbackRequest::new(provider, current_url, callback_path(provider), params)
            .with_kept_token(kept);
        Ok::<_, AuthError>(state.reconciler.reconcile(&request).await?)
    }
    .await;

    match reconciled {
        Ok(result) => state.handler.handle(result, jar).await,
        Err(e) => (jar, e).into_response(),
    }
}

/// Callback route derived from the provider path segment, so both legs agree.
fn callback_path(provider: &str) -> String {
    AuthConfig::callback_path(&normalize_key(provider).unwrap_or_default())
}
