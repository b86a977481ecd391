//! HTML pages of the demo app.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use loginbridge_auth::{AuthConfig, AuthState, LoginQuery};
use loginbridge_core::provider::ProviderError;

use crate::session::{self, SignedInUser};

/// Handler for the index page (GET /).
///
/// Lists a login link per registered provider and greets the signed-in user.
/// `return_url` is forwarded to the login links.
pub async fn index(
    State(auth): State<AuthState>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> Html<String> {
    let return_param = query
        .return_url
        .filter(|r| !r.trim().is_empty())
        .map(|r| {
            url::form_urlencoded::Serializer::new(String::new())
                .append_pair("return_url", &r)
                .finish()
        })
        .map(|q| format!("?{q}"))
        .unwrap_or_default();

    let mut links = String::new();
    for key in auth.registry.keys() {
        let Some(client) = auth.registry.client(&key) else {
            continue;
        };
        let href = format!("{}{return_param}", AuthConfig::login_path(&key));
        links.push_str(&format!(
            r#"<li><a href="{}">Continue with {}</a></li>"#,
            attr(&href),
            text(client.name()),
        ));
    }

    if links.is_empty() {
        links.push_str("<li>No identity providers configured.</li>");
    }

    let greeting = match SignedInUser::from_jar(&jar) {
        Some(user) => format!(
            r#"<p>Signed in as <strong>{}</strong> via {}.</p>
<form method="post" action="/logout"><button type="submit">Sign out</button></form>"#,
            text(&user.display_name),
            text(&user.provider),
        ),
        None => "<p>You are not signed in.</p>".to_string(),
    };

    Html(page(
        "LoginBridge",
        &format!("<h1>LoginBridge</h1>\n{greeting}\n<ul>\n{links}\n</ul>"),
    ))
}

/// Handler for POST /logout.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::sign_out(jar), Redirect::to("/"))
}

/// Page shown when the provider did not confirm an identity.
pub fn login_failed(provider_key: &str, failure: &ProviderError) -> Html<String> {
    let reason = match failure {
        ProviderError::Denied { .. } => "The sign-in was cancelled or refused.",
        _ => "The provider could not confirm your identity.",
    };

    Html(page(
        "Login failed",
        &format!(
            r#"<h1>Login failed</h1>
<p>{}</p>
<p><a href="{}">Try again</a> or go back to the <a href="/">home page</a>.</p>"#,
            text(reason),
            attr(&AuthConfig::login_path(provider_key)),
        ),
    ))
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
</head>
<body>
{body}
</body>
</html>"#,
        text(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_page_escapes_provider_key() {
        let Html(html) = login_failed(
            "<script>",
            &ProviderError::Exchange("boom".to_string()),
        );

        assert!(!html.contains("<script>"));
        assert!(html.contains("could not confirm"));
        assert!(!html.contains("boom"));
    }
}
