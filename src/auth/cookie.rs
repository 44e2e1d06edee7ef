//! Defines functions for storing the admin session token in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::auth::session::SessionToken;

pub(crate) const COOKIE_SESSION: &str = "admin-session";

/// Add the session cookie to the cookie jar.
///
/// The cookie is `HttpOnly`, `SameSite=Lax`, scoped to the whole site, and
/// expires after `max_age`. `secure` should be true whenever the server is
/// reached over HTTPS.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    token: &SessionToken,
    max_age: Duration,
    secure: bool,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, token.as_str().to_owned()))
            .path("/")
            .max_age(max_age)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar, secure: bool) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    )
}

/// Get the session token from the cookie jar, if the client sent one.
pub(crate) fn get_session_token(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(COOKIE_SESSION)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|token| !token.is_empty())
}
