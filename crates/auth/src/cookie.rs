//! Trusted client-side store for the kept token half.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;

/// Path the state cookie is scoped to; both login and callback routes live under it.
pub const STATE_COOKIE_PATH: &str = "/auth";

/// HttpOnly cookie holding the kept half of the anti-forgery token between
/// the login redirect and the provider callback.
#[derive(Debug, Clone)]
pub struct StateCookie {
    name: String,
    secure: bool,
    same_site: SameSite,
    max_age: Duration,
}

impl StateCookie {
    pub fn new(name: impl Into<String>, secure: bool, same_site: SameSite, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            same_site,
            max_age,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `value`, replacing any earlier login attempt.
    pub fn put(&self, jar: CookieJar, value: String) -> CookieJar {
        let cookie = Cookie::build((self.name.clone(), value))
            .path(STATE_COOKIE_PATH)
            .http_only(true)
            // Browsers drop SameSite=None cookies that are not secure.
            .secure(self.secure || self.same_site == SameSite::None)
            .same_site(self.same_site)
            .max_age(time::Duration::seconds(
                i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX),
            ))
            .build();

        jar.add(cookie)
    }

    pub fn get(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Expire the cookie so the kept half can only be used once.
    pub fn invalidate(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(self.name.clone()).path(STATE_COOKIE_PATH))
    }
}
