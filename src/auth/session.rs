//! Database-backed admin sessions.
//!
//! The client only ever sees the opaque [SessionToken]. The database stores a
//! SHA-256 digest of the token, so a leaked database cannot be replayed as cookies.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use rusqlite::{Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::admin::{Admin, AdminId, map_admin_row_with_offset},
    database_id::DatabaseId,
    db::RowsAffected,
};

/// How long a session lasts after log-in.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(7);

/// The number of random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// The opaque value stored in the session cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a token from 256 bits of OS randomness.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The token as sent to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The digest of a token that is stored in place of the token itself.
fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

/// A row of the `admin_session` table.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSession {
    /// The session's ID.
    pub id: DatabaseId,
    /// The admin that owns the session.
    pub admin_id: AdminId,
    /// The session is rejected at or after this time.
    pub expires_at: OffsetDateTime,
    /// When the session was created.
    pub created_at: OffsetDateTime,
}

pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS admin_session (
            id INTEGER PRIMARY KEY,
            admin_id INTEGER NOT NULL,
            token_hash TEXT UNIQUE NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(admin_id) REFERENCES admin(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_admin_session_admin_id ON admin_session(admin_id)",
        (),
    )?;

    Ok(())
}

/// Start a session for `admin_id` that lasts `duration` from `now`.
///
/// Returns the token for the client along with the stored session.
pub fn create_session(
    admin_id: AdminId,
    duration: Duration,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(SessionToken, AdminSession), Error> {
    let token = SessionToken::generate();

    let session = connection.query_row(
        "INSERT INTO admin_session (admin_id, token_hash, expires_at, created_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, admin_id, expires_at, created_at",
        (admin_id, hash_token(token.as_str()), now + duration, now),
        map_session_row,
    )?;

    Ok((token, session))
}

/// Resolve `token` to the admin that owns it.
///
/// Returns `None` when the token is unknown, the session has expired, or the
/// admin is inactive. Expired sessions are deleted. Database errors are
/// logged and also produce `None`, so callers can treat `None` as "not authenticated".
pub fn validate_session(token: &str, now: OffsetDateTime, connection: &Connection) -> Option<Admin> {
    let found = connection
        .query_row(
            "SELECT s.id, s.admin_id, s.expires_at, s.created_at,
                a.id, a.email, a.password, a.first_name, a.last_name, a.role, a.is_active,
                a.last_login_at, a.created_at
            FROM admin_session s
            INNER JOIN admin a ON a.id = s.admin_id
            WHERE s.token_hash = ?1",
            (hash_token(token),),
            |row| Ok((map_session_row(row)?, map_admin_row_with_offset(row, 4)?)),
        )
        .optional();

    match found {
        Ok(Some((session, _))) if session.expires_at <= now => {
            if let Err(error) =
                connection.execute("DELETE FROM admin_session WHERE id = ?1", (session.id,))
            {
                tracing::error!("could not delete expired session {}: {error}", session.id);
            }
            None
        }
        Ok(Some((_, admin))) if !admin.is_active => {
            tracing::debug!("rejected session for inactive admin {}", admin.id);
            None
        }
        Ok(Some((_, admin))) => Some(admin),
        Ok(None) => None,
        Err(error) => {
            tracing::error!("could not validate session: {error}");
            None
        }
    }
}

/// Delete the session for `token`, if there is one.
pub fn delete_session(token: &str, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM admin_session WHERE token_hash = ?1",
            (hash_token(token),),
        )
        .map_err(Error::from)
}

/// Delete every session that expired at or before `now`.
pub fn delete_expired_sessions(
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM admin_session WHERE expires_at <= ?1", (now,))
        .map_err(Error::from)
}

fn map_session_row(row: &Row) -> Result<AdminSession, rusqlite::Error> {
    Ok(AdminSession {
        id: row.get(0)?,
        admin_id: row.get(1)?,
        expires_at: row.get(2)?,
        created_at: row.get(3)?,
    })
}
