//! The audit trail of admin actions on transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::AdminId,
    database_id::DatabaseId,
    sql_enum::sql_text_enum,
    timestamp,
    transaction::core::{TransactionId, TransactionStatus},
};

sql_text_enum! {
    /// What an admin did to a transaction.
    pub enum AuditAction {
        /// The transaction was approved.
        Approve => "APPROVE",
        /// The transaction was rejected and refunded.
        Reject => "REJECT",
        /// The transaction's display details were changed.
        Edit => "EDIT",
    }
}

/// One admin action on a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// The entry's ID.
    pub id: DatabaseId,
    /// The transaction that was acted on.
    pub transaction_id: TransactionId,
    /// The admin that acted, if they still exist.
    pub admin_id: Option<AdminId>,
    /// What the admin did.
    pub action: AuditAction,
    /// The transaction's status before the action.
    pub previous_status: TransactionStatus,
    /// The transaction's status after the action.
    pub new_status: TransactionStatus,
    /// A note from the admin, or a summary of the change.
    pub notes: Option<String>,
    /// When the action happened.
    #[serde(with = "timestamp::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to record an [AuditLogEntry].
#[derive(Debug, Clone)]
pub struct NewAuditLogEntry<'a> {
    /// The transaction that was acted on.
    pub transaction_id: TransactionId,
    /// The admin that acted.
    pub admin_id: AdminId,
    /// What the admin did.
    pub action: AuditAction,
    /// The transaction's status before the action.
    pub previous_status: TransactionStatus,
    /// The transaction's status after the action.
    pub new_status: TransactionStatus,
    /// A note from the admin.
    pub notes: Option<&'a str>,
}

pub fn create_audit_log_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transaction_audit_log (
            id INTEGER PRIMARY KEY,
            transaction_id INTEGER NOT NULL,
            admin_id INTEGER,
            action TEXT NOT NULL,
            previous_status TEXT NOT NULL,
            new_status TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(admin_id) REFERENCES admin(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_audit_log_transaction_id
        ON transaction_audit_log(transaction_id)",
        (),
    )?;

    Ok(())
}

const AUDIT_LOG_COLUMNS: &str =
    "id, transaction_id, admin_id, action, previous_status, new_status, notes, created_at";

/// Append an entry to the audit log.
pub fn create_audit_log_entry(
    entry: NewAuditLogEntry,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<AuditLogEntry, Error> {
    connection
        .query_row(
            &format!(
                "INSERT INTO transaction_audit_log
                    (transaction_id, admin_id, action, previous_status, new_status, notes, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                RETURNING {AUDIT_LOG_COLUMNS}"
            ),
            (
                entry.transaction_id,
                entry.admin_id,
                entry.action,
                entry.previous_status,
                entry.new_status,
                entry.notes,
                now,
            ),
            map_audit_log_row,
        )
        .map_err(Error::from)
}

/// Get the audit log of a transaction, oldest first.
pub fn get_audit_log(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Vec<AuditLogEntry>, Error> {
    connection
        .prepare(&format!(
            "SELECT {AUDIT_LOG_COLUMNS} FROM transaction_audit_log
            WHERE transaction_id = ?1
            ORDER BY created_at ASC, id ASC"
        ))?
        .query_map((transaction_id,), map_audit_log_row)?
        .collect::<Result<Vec<_>, rusqlite::Error>>()
        .map_err(Error::from)
}

fn map_audit_log_row(row: &Row) -> Result<AuditLogEntry, rusqlite::Error> {
    Ok(AuditLogEntry {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        admin_id: row.get(2)?,
        action: row.get(3)?,
        previous_status: row.get(4)?,
        new_status: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}
