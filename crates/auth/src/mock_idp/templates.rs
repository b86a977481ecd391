//! HTML templates for the mock IdP login pages.

use html_escape::encode_double_quoted_attribute as attr;
use html_escape::encode_text as text;

/// Values rendered into the mock login page.
pub struct LoginPage<'a> {
    pub provider: &'a str,
    pub provider_name: &'a str,
    pub state: &'a str,
    pub redirect_uri: &'a str,
    pub identifier: Option<&'a str>,
}

/// Generate the HTML login page for a provider.
pub fn login_page(page: &LoginPage<'_>) -> String {
    let identifier = page.identifier.unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Mock {title} Sign In (DEV ONLY)</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, sans-serif; max-width: 400px; margin: 100px auto; padding: 20px; }}
        .warning {{ background: #fef3c7; border: 1px solid #f59e0b; padding: 12px; border-radius: 6px; margin-bottom: 20px; }}
        label {{ display: block; margin-top: 12px; }}
        input {{ width: 100%; padding: 8px; box-sizing: border-box; }}
        button {{ margin-top: 16px; padding: 10px 16px; }}
    </style>
</head>
<body>
    <div class="warning">Development only: no real authentication happens here.</div>
    <h1>Mock {title} Sign In</h1>
    <form method="POST" action="/authorize/submit">
        <input type="hidden" name="provider" value="{provider}" />
        <input type="hidden" name="state" value="{state}" />
        <input type="hidden" name="redirect_uri" value="{redirect_uri}" />
        <label>Email <input type="email" name="email" value="test@example.com" /></label>
        <label>Name <input type="text" name="name" value="Test User" /></label>
        <label>Identifier <input type="text" name="identifier" value="{identifier}" /></label>
        <button type="submit" name="decision" value="allow">Sign in</button>
        <button type="submit" name="decision" value="deny">Deny</button>
    </form>
</body>
</html>"#,
        title = text(page.provider_name),
        provider = attr(page.provider),
        state = attr(page.state),
        redirect_uri = attr(page.redirect_uri),
        identifier = attr(identifier),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_untrusted_values() {
        let html = login_page(&LoginPage {
            provider: "google",
            provider_name: "<script>",
            state: "\"><script>",
            redirect_uri: "http://app/cb",
            identifier: None,
        });

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
