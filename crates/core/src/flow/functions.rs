use url::Url;

use super::FlowError;

/// Longest post-login target, in bytes, that is bound into a token pair.
///
/// The kept half grows with the target and browsers drop cookies over 4096
/// bytes, so longer targets are not carried.
pub const MAX_RETURN_TARGET_LEN: usize = 2048;

/// Pick the post-login target to bind into the token: an explicit return URL
/// wins over the referer. Blank values and values longer than
/// `MAX_RETURN_TARGET_LEN` count as absent.
pub fn choose_return_target<'a>(
    explicit: Option<&'a str>,
    referer: Option<&'a str>,
) -> Option<&'a str> {
    let usable = |value: &&str| {
        if value.trim().is_empty() {
            return false;
        }
        if value.len() > MAX_RETURN_TARGET_LEN {
            tracing::warn!(
                len = value.len(),
                max = MAX_RETURN_TARGET_LEN,
                "dropping oversize post-login target"
            );
            return false;
        }
        true
    };
    explicit.filter(usable).or_else(|| referer.filter(usable))
}

/// Parse extra data recovered from a token pair into a redirect URL.
/// Relative targets resolve against `current_url`.
///
/// # Errors
///
/// Returns `FlowError::InvalidRedirectData` if the value is not a URI reference.
pub fn parse_redirect_data(extra: &str, current_url: &Url) -> Result<Url, FlowError> {
    let invalid = |reason: String| FlowError::InvalidRedirectData {
        value: extra.to_string(),
        reason,
    };

    match Url::parse(extra) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            current_url.join(extra).map_err(|e| invalid(e.to_string()))
        }
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// True if `target` points at the same origin as `base`.
///
/// Used by hosts that only follow post-login redirects back into the
/// application.
pub fn is_local_redirect(target: &Url, base: &Url) -> bool {
    let origin = target.origin();
    origin.is_tuple() && origin == base.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://app.example/auth/google/callback?code=c").unwrap()
    }

    #[test]
    fn explicit_target_wins_over_referer() {
        assert_eq!(
            choose_return_target(Some("/settings"), Some("https://app.example/dashboard")),
            Some("/settings")
        );
    }

    #[test]
    fn referer_is_used_when_explicit_is_blank() {
        assert_eq!(
            choose_return_target(Some(""), Some("https://app.example/dashboard")),
            Some("https://app.example/dashboard")
        );
        assert_eq!(
            choose_return_target(None, Some("https://app.example/dashboard")),
            Some("https://app.example/dashboard")
        );
    }

    #[test]
    fn no_target_when_both_blank() {
        assert_eq!(choose_return_target(None, None), None);
        assert_eq!(choose_return_target(Some(" "), Some("")), None);
    }

    #[test]
    fn target_at_the_length_cap_is_kept() {
        let target = format!("/x?{}", "a".repeat(MAX_RETURN_TARGET_LEN - 3));
        assert_eq!(target.len(), MAX_RETURN_TARGET_LEN);

        assert_eq!(choose_return_target(Some(&target), None), Some(target.as_str()));
    }

    #[test]
    fn oversize_target_is_dropped() {
        let target = format!("/x?{}", "a".repeat(MAX_RETURN_TARGET_LEN - 2));

        assert_eq!(choose_return_target(Some(&target), None), None);
        assert_eq!(
            choose_return_target(Some(&target), Some("https://app.example/dashboard")),
            Some("https://app.example/dashboard")
        );
        assert_eq!(choose_return_target(None, Some(&target)), None);
    }

    #[test]
    fn parses_absolute_redirect_data() {
        let url = parse_redirect_data("https://app.example/dashboard", &base()).unwrap();
        assert_eq!(url.as_str(), "https://app.example/dashboard");
    }

    #[test]
    fn resolves_relative_redirect_data() {
        let url = parse_redirect_data("/calendar/123?view=week", &base()).unwrap();
        assert_eq!(url.as_str(), "https://app.example/calendar/123?view=week");
    }

    #[test]
    fn rejects_malformed_redirect_data() {
        assert!(matches!(
            parse_redirect_data("http://[::1", &base()),
            Err(FlowError::InvalidRedirectData { .. })
        ));
    }

    #[test]
    fn local_redirect_requires_same_origin() {
        let base = base();
        let local = Url::parse("https://app.example/dashboard").unwrap();
        let other_port = Url::parse("https://app.example:8443/dashboard").unwrap();
        let foreign = Url::parse("https://evil.example/").unwrap();
        let script = Url::parse("javascript:alert(1)").unwrap();

        assert!(is_local_redirect(&local, &base));
        assert!(!is_local_redirect(&other_port, &base));
        assert!(!is_local_redirect(&foreign, &base));
        assert!(!is_local_redirect(&script, &base));
    }
}
