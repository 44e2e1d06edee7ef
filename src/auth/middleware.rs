//! Authentication middleware that resolves the session cookie to an admin.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{
        cookie::{get_session_token, invalidate_session_cookie},
        session::validate_session,
    },
    db::lock_connection,
};

/// The state needed to log in, log out and check sessions.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts after log-in.
    pub session_duration: Duration,
    /// Whether cookies should only be sent over HTTPS.
    pub secure_cookies: bool,
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            secure_cookies: state.runtime_mode.secure_cookies(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// On success the [crate::Admin] that owns the session is added to the
/// request extensions and the request is passed on. Otherwise a 401 JSON
/// response is returned; if a stale cookie was sent, it is cleared.
pub async fn auth_guard(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = get_session_token(&jar) else {
        return Error::SessionMissing.into_response();
    };

    let admin = {
        let connection = match lock_connection(&state.db_connection) {
            Ok(connection) => connection,
            Err(error) => return error.into_response(),
        };

        validate_session(&token, OffsetDateTime::now_utc(), &connection)
    };

    match admin {
        Some(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        None => (
            invalidate_session_cookie(jar, state.secure_cookies),
            Error::InvalidSession,
        )
            .into_response(),
    }
}
