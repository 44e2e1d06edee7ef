//! Handles admin log-in requests.

use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{
        admin::{Admin, get_admin_by_email, record_log_in},
        cookie::set_session_cookie,
        middleware::AuthState,
        session::{create_session, delete_expired_sessions},
    },
    db::lock_connection,
    email::validate_email,
    extract::JsonBody,
};

/// The credentials sent to the log-in endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// The admin's email.
    pub email: String,
    /// The admin's password in plain text.
    pub password: String,
}

impl LogInData {
    fn validate(&self) -> Result<(), Error> {
        validate_email(&self.email)?;

        if self.password.is_empty() {
            return Err(Error::InvalidBody("password: Password is required".to_owned()));
        }

        Ok(())
    }
}

/// The body of a successful log-in response.
#[derive(Debug, Serialize)]
pub struct LogInResponse {
    message: &'static str,
    admin: Admin,
}

/// Handler for log-in requests via the POST method.
///
/// On success a new session is stored, the admin's last log-in time is
/// recorded, and the session token is set as a private cookie.
///
/// # Errors
///
/// - [Error::InvalidBody] if the email or password is missing or malformed.
/// - [Error::InvalidCredentials] if there is no active admin with that email
///   and password. The same error is used for every case so that the
///   response does not reveal which emails belong to admins.
/// - An internal error if the database or password hashing fails.
pub async fn post_log_in(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    JsonBody(log_in_data): JsonBody<LogInData>,
) -> Result<(PrivateCookieJar, Json<LogInResponse>), Error> {
    log_in_data.validate()?;

    // The lock is released before the slow password check.
    let mut admin = {
        let connection = lock_connection(&state.db_connection)?;

        match get_admin_by_email(&log_in_data.email, &connection) {
            Ok(admin) => admin,
            Err(Error::NotFound) => {
                tracing::debug!("log-in attempt for unknown email");
                return Err(Error::InvalidCredentials);
            }
            Err(error) => return Err(error),
        }
    };

    if !admin.is_active {
        tracing::info!("log-in attempt for inactive admin {}", admin.id);
        return Err(Error::InvalidCredentials);
    }

    if !admin.password_hash.verify(&log_in_data.password)? {
        tracing::info!("log-in attempt with wrong password for admin {}", admin.id);
        return Err(Error::InvalidCredentials);
    }

    let now = OffsetDateTime::now_utc();
    let connection = lock_connection(&state.db_connection)?;

    let purged = delete_expired_sessions(now, &connection)?;
    if purged > 0 {
        tracing::debug!("purged {purged} expired sessions");
    }

    let (token, _) = create_session(admin.id, state.session_duration, now, &connection)?;
    record_log_in(admin.id, now, &connection)?;
    admin.last_login_at = Some(now);

    tracing::info!("admin {} logged in", admin.id);

    let jar = set_session_cookie(jar, &token, state.session_duration, state.secure_cookies);

    Ok((
        jar,
        Json(LogInResponse {
            message: "Login successful",
            admin,
        }),
    ))
}
