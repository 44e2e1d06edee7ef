//! Back-office administrators and their database table.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error, database_id::DatabaseId, email::validate_email, password::PasswordHash,
    sql_enum::sql_text_enum, timestamp,
};

/// The ID of an [Admin].
pub type AdminId = DatabaseId;

sql_text_enum! {
    /// What an admin is allowed to do.
    pub enum AdminRole {
        /// Day-to-day back-office work.
        Admin => "ADMIN",
        /// Full access, including managing other admins.
        SuperAdmin => "SUPER_ADMIN",
    }
}

/// A back-office administrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// The admin's ID.
    pub id: AdminId,
    /// The email used to log in, stored in lower case.
    pub email: String,
    /// The bcrypt hash of the admin's password.
    #[serde(skip)]
    pub password_hash: PasswordHash,
    /// The admin's given name.
    pub first_name: String,
    /// The admin's family name.
    pub last_name: String,
    /// What the admin is allowed to do.
    pub role: AdminRole,
    /// Inactive admins cannot log in and their sessions are rejected.
    pub is_active: bool,
    /// When the admin last logged in successfully.
    #[serde(with = "timestamp::rfc3339_option")]
    pub last_login_at: Option<OffsetDateTime>,
    /// When the admin was created.
    #[serde(with = "timestamp::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to create an [Admin].
#[derive(Debug, Clone)]
pub struct NewAdmin {
    /// The email used to log in.
    pub email: String,
    /// The hashed password.
    pub password_hash: PasswordHash,
    /// The admin's given name.
    pub first_name: String,
    /// The admin's family name.
    pub last_name: String,
    /// What the admin is allowed to do.
    pub role: AdminRole,
}

pub fn create_admin_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS admin (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'ADMIN',
            is_active INTEGER NOT NULL DEFAULT 1,
            last_login_at TEXT,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

const ADMIN_COLUMNS: &str =
    "id, email, password, first_name, last_name, role, is_active, last_login_at, created_at";

/// Insert a new admin into the database.
///
/// # Errors
/// Returns [Error::InvalidBody] if the email is malformed,
/// [Error::DuplicateEmail] if another admin uses the same email, or
/// [Error::SqlError] for any other SQL error.
pub fn create_admin(new_admin: NewAdmin, connection: &Connection) -> Result<Admin, Error> {
    let email = validate_email(&new_admin.email)?;

    connection
        .query_row(
            &format!(
                "INSERT INTO admin (email, password, first_name, last_name, role, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING {ADMIN_COLUMNS}"
            ),
            (
                &email,
                &new_admin.password_hash,
                &new_admin.first_name,
                &new_admin.last_name,
                new_admin.role,
                OffsetDateTime::now_utc(),
            ),
            map_admin_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref description))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && description.contains("admin.email") =>
            {
                Error::DuplicateEmail(email.clone())
            }
            error => error.into(),
        })
}

/// Get the admin with `email`. Emails are compared case-insensitively.
///
/// # Errors
/// Returns [Error::NotFound] if no admin uses `email`.
pub fn get_admin_by_email(email: &str, connection: &Connection) -> Result<Admin, Error> {
    connection
        .query_row(
            &format!("SELECT {ADMIN_COLUMNS} FROM admin WHERE email = ?1"),
            (email.trim().to_lowercase(),),
            map_admin_row,
        )
        .map_err(Error::from)
}

/// Record that the admin logged in at `logged_in_at`.
pub fn record_log_in(
    id: AdminId,
    logged_in_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    match connection.execute(
        "UPDATE admin SET last_login_at = ?1 WHERE id = ?2",
        (logged_in_at, id),
    )? {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

fn map_admin_row(row: &Row) -> Result<Admin, rusqlite::Error> {
    map_admin_row_with_offset(row, 0)
}

/// Map the admin columns of `row`, starting at column `offset`, in the order
/// of the admin table.
pub fn map_admin_row_with_offset(row: &Row, offset: usize) -> Result<Admin, rusqlite::Error> {
    Ok(Admin {
        id: row.get(offset)?,
        email: row.get(offset + 1)?,
        password_hash: row.get(offset + 2)?,
        first_name: row.get(offset + 3)?,
        last_name: row.get(offset + 4)?,
        role: row.get(offset + 5)?,
        is_active: row.get(offset + 6)?,
        last_login_at: row.get(offset + 7)?,
        created_at: row.get(offset + 8)?,
    })
}
