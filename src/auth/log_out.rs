use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error, MessageBody,
    auth::{
        cookie::{get_session_token, invalidate_session_cookie},
        middleware::AuthState,
        session::delete_session,
    },
    db::lock_connection,
};

/// Invalidate the session cookie and delete the session it refers to.
///
/// Logging out without a session, or with a session that no longer exists,
/// still succeeds.
pub async fn post_log_out(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<MessageBody>), Error> {
    if let Some(token) = get_session_token(&jar) {
        let connection = lock_connection(&state.db_connection)?;
        let deleted = delete_session(&token, &connection)?;
        tracing::debug!("deleted {deleted} session(s) on log-out");
    }

    Ok((
        invalidate_session_cookie(jar, state.secure_cookies),
        Json(MessageBody::new("Logged out successfully")),
    ))
}
