//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, ToSql};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    customer::{BankAccountId, UserId},
    database_id::DatabaseId,
    money::{from_minor_units, to_minor_units},
    pagination::Page,
    sql_enum::sql_text_enum,
    timestamp,
};

// ============================================================================
// MODELS
// ============================================================================

/// The ID of a [Transaction].
pub type TransactionId = DatabaseId;

sql_text_enum! {
    /// Which way money moves in a transaction.
    pub enum TransactionType {
        /// Money paid into an account.
        Deposit => "DEPOSIT",
        /// Money taken out of an account.
        Withdrawal => "WITHDRAWAL",
        /// Money sent from an account to someone else.
        Transfer => "TRANSFER",
        /// Money returned to an account after a rejected transaction.
        Refund => "REFUND",
    }
}

sql_text_enum! {
    /// Where a transaction is in its lifecycle.
    ///
    /// The only transitions are `PENDING -> COMPLETED` and `PENDING -> FAILED`.
    pub enum TransactionStatus {
        /// Waiting for an admin to approve or reject it.
        Pending => "PENDING",
        /// Settled.
        Completed => "COMPLETED",
        /// Rejected, with any reserved funds refunded.
        Failed => "FAILED",
    }
}

sql_text_enum! {
    /// The outcome of an admin's review of a transaction.
    pub enum ApprovalStatus {
        /// Not reviewed yet.
        Pending => "PENDING",
        /// Approved by an admin, or created already approved.
        Approved => "APPROVED",
        /// Rejected by an admin.
        Rejected => "REJECTED",
    }
}

/// A movement of money into or out of a customer's bank account.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The customer the transaction belongs to.
    pub user_id: Option<UserId>,
    /// The bank account the transaction moves money in or out of.
    pub bank_account_id: Option<BankAccountId>,
    /// Which way the money moves.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money moved, always positive.
    pub amount: Decimal,
    /// The fee charged on top of `amount`.
    pub fee: Decimal,
    /// Where the transaction is in its lifecycle.
    pub status: TransactionStatus,
    /// The outcome of the admin review.
    pub admin_approval_status: ApprovalStatus,
    /// The ISO 4217 currency code.
    pub currency: String,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// A reference for the customer or the other party.
    pub reference: Option<String>,
    /// The name of the person or business receiving the money.
    pub recipient_name: Option<String>,
    /// The account number receiving the money.
    pub recipient_account: Option<String>,
    /// The bank receiving the money.
    pub recipient_bank: Option<String>,
    /// A spending category, e.g. "Groceries".
    pub category: Option<String>,
    /// When an admin approved or rejected the transaction.
    #[serde(with = "timestamp::rfc3339_option")]
    pub approval_date: Option<OffsetDateTime>,
    /// When the transaction was settled.
    #[serde(with = "timestamp::rfc3339_option")]
    pub completion_date: Option<OffsetDateTime>,
    /// When the transaction was created.
    #[serde(with = "timestamp::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "timestamp::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(transaction_type: TransactionType, amount: Decimal) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            fee: Decimal::ZERO,
            status: TransactionStatus::Pending,
            admin_approval_status: ApprovalStatus::Pending,
            user_id: None,
            bank_account_id: None,
            currency: "USD".to_owned(),
            description: None,
            reference: None,
            recipient_name: None,
            recipient_account: None,
            recipient_bank: None,
            category: None,
            approval_date: None,
            completion_date: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// New transactions default to a pending, unreviewed transaction in US
/// dollars with no fee that is not linked to a customer. Pass the builder to
/// [create_transaction] to store it.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    transaction_type: TransactionType,
    amount: Decimal,
    fee: Decimal,
    status: TransactionStatus,
    admin_approval_status: ApprovalStatus,
    user_id: Option<UserId>,
    bank_account_id: Option<BankAccountId>,
    currency: String,
    description: Option<String>,
    reference: Option<String>,
    recipient_name: Option<String>,
    recipient_account: Option<String>,
    recipient_bank: Option<String>,
    category: Option<String>,
    approval_date: Option<OffsetDateTime>,
    completion_date: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the fee charged on top of the amount.
    pub fn fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    /// Link the transaction to a customer and one of their accounts.
    pub fn account(mut self, user_id: UserId, bank_account_id: BankAccountId) -> Self {
        self.user_id = Some(user_id);
        self.bank_account_id = Some(bank_account_id);
        self
    }

    /// Mark the transaction as approved by an admin and settled at `at`.
    pub fn completed(mut self, at: OffsetDateTime) -> Self {
        self.status = TransactionStatus::Completed;
        self.admin_approval_status = ApprovalStatus::Approved;
        self.approval_date = Some(at);
        self.completion_date = Some(at);
        self
    }

    /// Set the currency code.
    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_owned();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the reference.
    pub fn reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    /// Set who receives the money.
    pub fn recipient(mut self, name: &str, account: &str, bank: &str) -> Self {
        self.recipient_name = Some(name.to_owned());
        self.recipient_account = Some(account.to_owned());
        self.recipient_bank = Some(bank.to_owned());
        self
    }

    /// Set the spending category.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }
}

/// A transaction with the name of the customer it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListItem {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The full name of the customer, if the transaction is linked to one.
    pub customer_name: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER,
            bank_account_id INTEGER,
            transaction_type TEXT NOT NULL,
            amount INTEGER NOT NULL,
            fee INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING',
            admin_approval_status TEXT NOT NULL DEFAULT 'PENDING',
            currency TEXT NOT NULL DEFAULT 'USD',
            description TEXT,
            reference TEXT,
            recipient_name TEXT,
            recipient_account TEXT,
            recipient_bank TEXT,
            category TEXT,
            approval_date TEXT,
            completion_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(bank_account_id) REFERENCES bank_account(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // Composite index for the newest-first transaction list, optionally filtered by status.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_status_created
        ON \"transaction\"(status, created_at DESC)",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_bank_account_id
        ON \"transaction\"(bank_account_id)",
        (),
    )?;

    Ok(())
}

pub(crate) const TRANSACTION_COLUMNS: &str = "id, user_id, bank_account_id, transaction_type, \
    amount, fee, status, admin_approval_status, currency, description, reference, \
    recipient_name, recipient_account, recipient_bank, category, approval_date, \
    completion_date, created_at, updated_at";

/// Create a new transaction in the database from a builder, stamped with `now`.
///
/// Does not change any balances, see [crate::transaction::add_funds] for that.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount or fee is negative or has more than two decimal places,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount.is_sign_negative() || builder.fee.is_sign_negative() {
        return Err(Error::InvalidAmount(
            "transaction amounts and fees cannot be negative".to_owned(),
        ));
    }

    let amount = to_minor_units(builder.amount)?;
    let fee = to_minor_units(builder.fee)?;

    let transaction = connection.query_row(
        &format!(
            "INSERT INTO \"transaction\" (
                user_id, bank_account_id, transaction_type, amount, fee, status,
                admin_approval_status, currency, description, reference, recipient_name,
                recipient_account, recipient_bank, category, approval_date, completion_date,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)
            RETURNING {TRANSACTION_COLUMNS}"
        ),
        rusqlite::params![
            builder.user_id,
            builder.bank_account_id,
            builder.transaction_type,
            amount,
            fee,
            builder.status,
            builder.admin_approval_status,
            builder.currency,
            builder.description,
            builder.reference,
            builder.recipient_name,
            builder.recipient_account,
            builder.recipient_bank,
            builder.category,
            builder.approval_date,
            builder.completion_date,
            now,
        ],
        map_transaction_row,
    )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .query_row(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1"),
            (id,),
            map_transaction_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::TransactionNotFound,
            error => error,
        })
}

/// Get one page of transactions, newest first, optionally only those with `status`.
pub fn get_transaction_page(
    page: Page,
    status: Option<TransactionStatus>,
    connection: &Connection,
) -> Result<Vec<TransactionListItem>, Error> {
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    let (filter, filter_params): (&str, Vec<&dyn ToSql>) = match &status {
        Some(status) => ("WHERE status = ?3", vec![status as &dyn ToSql]),
        None => ("", vec![]),
    };

    let query = format!(
        "SELECT {TRANSACTION_COLUMNS},
            (SELECT first_name || ' ' || last_name FROM user WHERE user.id = \"transaction\".user_id)
        FROM \"transaction\"
        {filter}
        ORDER BY created_at DESC, id DESC
        LIMIT ?1 OFFSET ?2"
    );

    let mut params: Vec<&dyn ToSql> = vec![&limit, &offset];
    params.extend(filter_params);

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), |row| {
            Ok(TransactionListItem {
                transaction: map_transaction_row(row)?,
                customer_name: row.get(19)?,
            })
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Count the transactions, optionally only those with `status`.
pub fn count_transactions(
    status: Option<TransactionStatus>,
    connection: &Connection,
) -> Result<u64, Error> {
    let count: i64 = match status {
        Some(status) => connection.query_row(
            "SELECT COUNT(*) FROM \"transaction\" WHERE status = ?1",
            (status,),
            |row| row.get(0),
        )?,
        None => connection.query_row("SELECT COUNT(*) FROM \"transaction\"", (), |row| {
            row.get(0)
        })?,
    };

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Map a database row to a [Transaction].
///
/// The row must contain [TRANSACTION_COLUMNS] in order.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        bank_account_id: row.get(2)?,
        transaction_type: row.get(3)?,
        amount: from_minor_units(row.get(4)?),
        fee: from_minor_units(row.get(5)?),
        status: row.get(6)?,
        admin_approval_status: row.get(7)?,
        currency: row.get(8)?,
        description: row.get(9)?,
        reference: row.get(10)?,
        recipient_name: row.get(11)?,
        recipient_account: row.get(12)?,
        recipient_bank: row.get(13)?,
        category: row.get(14)?,
        approval_date: row.get(15)?,
        completion_date: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}
