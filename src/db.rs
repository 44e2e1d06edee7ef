//! Database setup and access helpers.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    auth::{create_admin_table, create_session_table},
    customer::{create_bank_account_table, create_user_table},
    transaction::{create_audit_log_table, create_transaction_table},
};

/// Create the tables for all of the domain models and enable foreign key
/// enforcement on `connection`.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if a table cannot be created or the changes cannot be committed.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Foreign keys are enforced per connection and cannot be changed inside a transaction.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_admin_table(&transaction)?;
    create_session_table(&transaction)?;
    create_user_table(&transaction)?;
    create_bank_account_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_audit_log_table(&transaction)?;

    transaction.commit()
}

/// Acquire the lock on the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the mutex has been poisoned.
pub fn lock_connection(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// The number of rows changed by an `UPDATE` or `DELETE`.
pub type RowsAffected = usize;
