//! Mock IdP server for development and testing.

use std::net::SocketAddr;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use url::Url;

use super::templates;
use crate::providers::MockCode;

#[derive(Deserialize)]
struct AuthorizeQuery {
    state: String,
    redirect_uri: String,
    name: Option<String>,
    identifier: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    provider: String,
    state: String,
    redirect_uri: String,
    email: String,
    name: Option<String>,
    identifier: Option<String>,
    /// `allow` or `deny`
    decision: String,
}

/// Mock IdP server that simulates provider authorization endpoints.
pub struct MockIdpServer {
    port: u16,
}

impl MockIdpServer {
    /// Create a new mock IdP server.
    ///
    /// # Arguments
    /// * `port` - The port to listen on (typically 3001)
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Routes served by the mock IdP:
    /// - `GET /{provider}/authorize` - login page for any provider key
    /// - `POST /authorize/submit` - form submission, redirects back to the callback
    pub fn router() -> Router {
        Router::new()
            .route("/{provider}/authorize", get(authorize))
            .route("/authorize/submit", post(authorize_submit))
    }

    /// Run the mock IdP server until the listener fails.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        tracing::info!("Mock IdP server listening on http://{}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, Self::router()).await
    }
}

async fn authorize(
    Path(provider): Path<String>,
    Query(params): Query<AuthorizeQuery>,
) -> Html<String> {
    Html(templates::login_page(&templates::LoginPage {
        provider: &provider,
        provider_name: params.name.as_deref().unwrap_or(&provider),
        state: &params.state,
        redirect_uri: &params.redirect_uri,
        identifier: params.identifier.as_deref(),
    }))
}

async fn authorize_submit(Form(form): Form<LoginForm>) -> Response {
    let Ok(mut callback) = Url::parse(&form.redirect_uri) else {
        return (StatusCode::BAD_REQUEST, "invalid redirect_uri").into_response();
    };

    if form.decision == "deny" {
        callback
            .query_pairs_mut()
            .append_pair("error", "access_denied")
            .append_pair("error_description", "The user denied the request")
            .append_pair("state", &form.state);
        return Redirect::to(callback.as_str()).into_response();
    }

    let identifier = form.identifier.filter(|i| !i.trim().is_empty());
    let sub = identifier
        .clone()
        .unwrap_or_else(|| format!("mock-{}-{}", form.provider, form.email));

    let code = MockCode {
        provider: form.provider,
        sub,
        email: Some(form.email).filter(|e| !e.is_empty()),
        name: form.name.filter(|n| !n.is_empty()),
        identifier,
    };

    let code = match code.encode() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Failed to encode mock code: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // State goes back exactly as received.
    callback
        .query_pairs_mut()
        .append_pair("code", &code)
        .append_pair("state", &form.state);

    Redirect::to(callback.as_str()).into_response()
}
