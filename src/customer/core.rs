//! Customers, their bank accounts, and the database functions that read and
//! write them.
//!
//! Balances are never written here. Every balance change goes through the
//! ledger in [crate::transaction] so that account balances, the owner's total
//! and the transaction history stay consistent.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error, database_id::DatabaseId, db::RowsAffected, email::validate_email,
    money::from_minor_units, sql_enum::sql_text_enum, timestamp,
};

// ============================================================================
// MODELS
// ============================================================================

/// The ID of a [User].
pub type UserId = DatabaseId;

/// The ID of a [BankAccount].
pub type BankAccountId = DatabaseId;

sql_text_enum! {
    /// The lifecycle state of a bank account.
    pub enum AccountStatus {
        /// The account can be used.
        Active => "ACTIVE",
        /// The account was frozen by an admin.
        Suspended => "SUSPENDED",
        /// The account was opened but not yet approved.
        PendingApproval => "PENDING_APPROVAL",
        /// The account has not been used for a long time.
        Inactive => "INACTIVE",
        /// The account was closed.
        Closed => "CLOSED",
    }
}

sql_text_enum! {
    /// The kind of bank account.
    pub enum AccountType {
        /// An everyday account.
        Checking => "CHECKING",
        /// A savings account.
        Savings => "SAVINGS",
        /// An account for a business.
        Business => "BUSINESS",
    }
}

/// A bank customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The customer's ID.
    pub id: UserId,
    /// The customer's given name.
    pub first_name: String,
    /// The customer's family name.
    pub last_name: String,
    /// The customer's email, unique across customers.
    pub email: String,
    /// The customer's phone number, if known.
    pub phone_number: Option<String>,
    /// The sum of the balances of the customer's bank accounts.
    pub total_balance: Decimal,
    /// Whether the customer's transactions are approved without review.
    pub auto_approved_transaction: bool,
    /// Whether the customer's identity has been verified.
    pub is_verified: bool,
    /// When the customer signed up.
    #[serde(with = "timestamp::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// The customer's full name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The data needed to create a [User].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The customer's given name.
    pub first_name: String,
    /// The customer's family name.
    pub last_name: String,
    /// The customer's email.
    pub email: String,
    /// The customer's phone number, if known.
    pub phone_number: Option<String>,
    /// Whether the customer's identity has been verified.
    pub is_verified: bool,
}

/// A customer's bank account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    /// The account's ID.
    pub id: BankAccountId,
    /// The ID of the customer that owns the account.
    pub user_id: UserId,
    /// A display name for the account.
    pub account_name: String,
    /// The account number, unique across accounts.
    pub account_number: String,
    /// The kind of account.
    pub account_type: AccountType,
    /// The ledger balance.
    pub balance: Decimal,
    /// The balance that can be spent right now.
    pub available_balance: Decimal,
    /// The account's lifecycle state.
    pub status: AccountStatus,
    /// The ISO 4217 currency code.
    pub currency: String,
    /// When the account was opened.
    #[serde(with = "timestamp::rfc3339")]
    pub opened_at: OffsetDateTime,
    /// When money last moved in or out of the account.
    #[serde(with = "timestamp::rfc3339_option")]
    pub last_activity_at: Option<OffsetDateTime>,
}

/// The data needed to open a [BankAccount]. Accounts always open with a zero balance.
#[derive(Debug, Clone)]
pub struct NewBankAccount {
    /// The ID of the customer that owns the account.
    pub user_id: UserId,
    /// A display name for the account.
    pub account_name: String,
    /// The account number.
    pub account_number: String,
    /// The kind of account.
    pub account_type: AccountType,
    /// The account's initial state.
    pub status: AccountStatus,
    /// The ISO 4217 currency code.
    pub currency: String,
}

/// The contact details of an account owner, shown next to the account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOwner {
    /// The customer's ID.
    pub id: UserId,
    /// The customer's full name.
    pub name: String,
    /// The customer's email.
    pub email: String,
    /// The customer's phone number, if known.
    pub phone_number: Option<String>,
    /// Whether the customer's transactions are approved without review.
    pub auto_approved_transaction: bool,
}

/// A bank account together with its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWithOwner {
    /// The account.
    #[serde(flatten)]
    pub account: BankAccount,
    /// The customer that owns the account.
    pub user: AccountOwner,
}

/// A customer together with their bank accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithAccounts {
    /// The customer.
    #[serde(flatten)]
    pub user: User,
    /// The customer's accounts, oldest first.
    pub bank_accounts: Vec<BankAccount>,
    /// The number of accounts the customer has.
    pub account_count: usize,
}

// ============================================================================
// TABLES
// ============================================================================

pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            phone_number TEXT,
            total_balance INTEGER NOT NULL DEFAULT 0,
            auto_approved_transaction INTEGER NOT NULL DEFAULT 0,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn create_bank_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS bank_account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            account_name TEXT NOT NULL,
            account_number TEXT UNIQUE NOT NULL,
            account_type TEXT NOT NULL,
            balance INTEGER NOT NULL DEFAULT 0,
            available_balance INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING_APPROVAL',
            currency TEXT NOT NULL DEFAULT 'USD',
            opened_at TEXT NOT NULL,
            last_activity_at TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_bank_account_user_id ON bank_account(user_id)",
        (),
    )?;

    Ok(())
}

// ============================================================================
// USERS
// ============================================================================

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone_number, total_balance, \
    auto_approved_transaction, is_verified, created_at";

/// Insert a new customer with a zero total balance.
///
/// # Errors
/// Returns [Error::InvalidBody] if the email is malformed, or
/// [Error::DuplicateEmail] if another customer uses the same email.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let email = validate_email(&new_user.email)?;

    connection
        .query_row(
            &format!(
                "INSERT INTO user (first_name, last_name, email, phone_number, is_verified, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING {USER_COLUMNS}"
            ),
            (
                &new_user.first_name,
                &new_user.last_name,
                &email,
                &new_user.phone_number,
                new_user.is_verified,
                OffsetDateTime::now_utc(),
            ),
            map_user_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref description))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && description.contains("user.email") =>
            {
                Error::DuplicateEmail(email.clone())
            }
            error => error.into(),
        })
}

/// Get the customer with `id`.
///
/// # Errors
/// Returns [Error::CustomerNotFound] if the customer does not exist.
pub fn get_user(id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?1"),
            (id,),
            map_user_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CustomerNotFound,
            error => error,
        })
}

/// Get every customer, newest first.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user ORDER BY created_at DESC, id DESC"
        ))?
        .query_map((), map_user_row)?
        .collect::<Result<Vec<User>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Set whether the customer's transactions are approved without review.
///
/// Returns the updated customer.
///
/// # Errors
/// Returns [Error::CustomerNotFound] if the customer does not exist.
pub fn set_auto_approval(
    id: UserId,
    auto_approved_transaction: bool,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .query_row(
            &format!(
                "UPDATE user SET auto_approved_transaction = ?1 WHERE id = ?2
                RETURNING {USER_COLUMNS}"
            ),
            (auto_approved_transaction, id),
            map_user_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CustomerNotFound,
            error => error,
        })
}

/// Delete the customer along with their accounts, transactions and audit logs.
///
/// # Errors
/// Returns [Error::CustomerNotFound] if the customer does not exist.
pub fn delete_user(id: UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected: RowsAffected =
        connection.execute("DELETE FROM user WHERE id = ?1", (id,))?;

    match rows_affected {
        0 => Err(Error::CustomerNotFound),
        _ => Ok(()),
    }
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
        total_balance: from_minor_units(row.get(5)?),
        auto_approved_transaction: row.get(6)?,
        is_verified: row.get(7)?,
        created_at: row.get(8)?,
    })
}

// ============================================================================
// BANK ACCOUNTS
// ============================================================================

const BANK_ACCOUNT_COLUMNS: &str = "id, user_id, account_name, account_number, account_type, \
    balance, available_balance, status, currency, opened_at, last_activity_at";

/// Open a bank account with a zero balance.
///
/// # Errors
/// Returns [Error::CustomerNotFound] if the owner does not exist, or
/// [Error::SqlError] if the account number is already used.
pub fn create_bank_account(
    new_account: NewBankAccount,
    connection: &Connection,
) -> Result<BankAccount, Error> {
    connection
        .query_row(
            &format!(
                "INSERT INTO bank_account
                    (user_id, account_name, account_number, account_type, status, currency, opened_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                RETURNING {BANK_ACCOUNT_COLUMNS}"
            ),
            (
                new_account.user_id,
                &new_account.account_name,
                &new_account.account_number,
                new_account.account_type,
                new_account.status,
                &new_account.currency,
                OffsetDateTime::now_utc(),
            ),
            map_bank_account_row,
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::CustomerNotFound
            }
            error => error.into(),
        })
}

/// Get the bank account with `id`.
///
/// # Errors
/// Returns [Error::BankAccountNotFound] if the account does not exist.
pub fn get_bank_account(id: BankAccountId, connection: &Connection) -> Result<BankAccount, Error> {
    connection
        .query_row(
            &format!("SELECT {BANK_ACCOUNT_COLUMNS} FROM bank_account WHERE id = ?1"),
            (id,),
            map_bank_account_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::BankAccountNotFound,
            error => error,
        })
}

/// Get the bank accounts owned by `user_id`, oldest first.
pub fn get_bank_accounts_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<BankAccount>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BANK_ACCOUNT_COLUMNS} FROM bank_account WHERE user_id = ?1 ORDER BY id"
        ))?
        .query_map((user_id,), map_bank_account_row)?
        .collect::<Result<Vec<BankAccount>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Get every bank account along with its owner, most recently opened first.
pub fn get_all_accounts_with_owner(
    connection: &Connection,
) -> Result<Vec<AccountWithOwner>, Error> {
    connection
        .prepare(
            "SELECT a.id, a.user_id, a.account_name, a.account_number, a.account_type,
                a.balance, a.available_balance, a.status, a.currency, a.opened_at,
                a.last_activity_at,
                u.id, u.first_name, u.last_name, u.email, u.phone_number,
                u.auto_approved_transaction
            FROM bank_account a
            INNER JOIN user u ON u.id = a.user_id
            ORDER BY a.opened_at DESC, a.id DESC",
        )?
        .query_map((), map_account_with_owner_row)?
        .collect::<Result<Vec<AccountWithOwner>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Get one bank account along with its owner.
///
/// # Errors
/// Returns [Error::BankAccountNotFound] if the account does not exist.
pub fn get_account_with_owner(
    id: BankAccountId,
    connection: &Connection,
) -> Result<AccountWithOwner, Error> {
    connection
        .query_row(
            "SELECT a.id, a.user_id, a.account_name, a.account_number, a.account_type,
                a.balance, a.available_balance, a.status, a.currency, a.opened_at,
                a.last_activity_at,
                u.id, u.first_name, u.last_name, u.email, u.phone_number,
                u.auto_approved_transaction
            FROM bank_account a
            INNER JOIN user u ON u.id = a.user_id
            WHERE a.id = ?1",
            (id,),
            map_account_with_owner_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::BankAccountNotFound,
            error => error,
        })
}

/// Set the status of a bank account and return the updated account.
///
/// # Errors
/// Returns [Error::BankAccountNotFound] if the account does not exist.
pub fn set_account_status(
    id: BankAccountId,
    status: AccountStatus,
    connection: &Connection,
) -> Result<BankAccount, Error> {
    connection
        .query_row(
            &format!(
                "UPDATE bank_account SET status = ?1 WHERE id = ?2
                RETURNING {BANK_ACCOUNT_COLUMNS}"
            ),
            (status, id),
            map_bank_account_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::BankAccountNotFound,
            error => error,
        })
}

/// Count bank accounts by status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    /// The number of accounts.
    pub total: u64,
    /// The number of [AccountStatus::Active] accounts.
    pub active: u64,
    /// The number of [AccountStatus::PendingApproval] accounts.
    pub pending_approval: u64,
    /// The number of [AccountStatus::Suspended] accounts.
    pub suspended: u64,
    /// The number of [AccountStatus::Inactive] accounts.
    pub inactive: u64,
    /// The number of [AccountStatus::Closed] accounts.
    pub closed: u64,
}

/// Tally the accounts in `accounts` by status.
pub fn count_accounts_by_status<'a>(
    accounts: impl IntoIterator<Item = &'a BankAccount>,
) -> AccountStats {
    accounts
        .into_iter()
        .fold(AccountStats::default(), |mut stats, account| {
            stats.total += 1;
            match account.status {
                AccountStatus::Active => stats.active += 1,
                AccountStatus::PendingApproval => stats.pending_approval += 1,
                AccountStatus::Suspended => stats.suspended += 1,
                AccountStatus::Inactive => stats.inactive += 1,
                AccountStatus::Closed => stats.closed += 1,
            }
            stats
        })
}

fn map_bank_account_row(row: &Row) -> Result<BankAccount, rusqlite::Error> {
    Ok(BankAccount {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_name: row.get(2)?,
        account_number: row.get(3)?,
        account_type: row.get(4)?,
        balance: from_minor_units(row.get(5)?),
        available_balance: from_minor_units(row.get(6)?),
        status: row.get(7)?,
        currency: row.get(8)?,
        opened_at: row.get(9)?,
        last_activity_at: row.get(10)?,
    })
}

fn map_account_with_owner_row(row: &Row) -> Result<AccountWithOwner, rusqlite::Error> {
    let account = map_bank_account_row(row)?;
    let first_name: String = row.get(12)?;
    let last_name: String = row.get(13)?;

    Ok(AccountWithOwner {
        account,
        user: AccountOwner {
            id: row.get(11)?,
            name: format!("{first_name} {last_name}"),
            email: row.get(14)?,
            phone_number: row.get(15)?,
            auto_approved_transaction: row.get(16)?,
        },
    })
}

#[cfg(test)]
mod user_tests {
    use crate::{Error, test_utils::must_create_test_connection};

    use super::{NewUser, create_user, delete_user, get_all_users, get_user, set_auto_approval};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            email: email.to_owned(),
            phone_number: Some("+64 21 555 0100".to_owned()),
            is_verified: true,
        }
    }

    #[test]
    fn create_user_starts_with_zero_balance() {
        let connection = must_create_test_connection();

        let user = create_user(new_user("jane@example.com"), &connection).unwrap();

        assert!(user.id > 0);
        assert_eq!(user.total_balance.to_string(), "0.00");
        assert!(!user.auto_approved_transaction);
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn create_user_fails_on_duplicate_email() {
        let connection = must_create_test_connection();
        create_user(new_user("jane@example.com"), &connection).unwrap();

        let result = create_user(new_user("Jane@Example.com"), &connection);

        assert_eq!(
            result,
            Err(Error::DuplicateEmail("jane@example.com".to_owned()))
        );
    }

    #[test]
    fn create_user_rejects_malformed_email() {
        let connection = must_create_test_connection();

        let result = create_user(new_user("jane doe@example.com"), &connection);

        assert!(matches!(result, Err(Error::InvalidBody(_))));
        assert!(get_all_users(&connection).unwrap().is_empty());
    }

    #[test]
    fn get_missing_user_is_customer_not_found() {
        let connection = must_create_test_connection();

        assert_eq!(get_user(9, &connection), Err(Error::CustomerNotFound));
    }

    #[test]
    fn get_all_users_is_newest_first() {
        let connection = must_create_test_connection();
        let first = create_user(new_user("first@example.com"), &connection).unwrap();
        let second = create_user(new_user("second@example.com"), &connection).unwrap();

        let users = get_all_users(&connection).unwrap();

        assert_eq!(users, [second, first]);
    }

    #[test]
    fn set_auto_approval_updates_flag() {
        let connection = must_create_test_connection();
        let user = create_user(new_user("jane@example.com"), &connection).unwrap();

        let updated = set_auto_approval(user.id, true, &connection).unwrap();

        assert!(updated.auto_approved_transaction);
        assert_eq!(get_user(user.id, &connection), Ok(updated));
    }

    #[test]
    fn set_auto_approval_on_missing_user_fails() {
        let connection = must_create_test_connection();

        assert_eq!(
            set_auto_approval(3, true, &connection),
            Err(Error::CustomerNotFound)
        );
    }

    #[test]
    fn delete_user_twice_fails() {
        let connection = must_create_test_connection();
        let user = create_user(new_user("jane@example.com"), &connection).unwrap();

        assert_eq!(delete_user(user.id, &connection), Ok(()));
        assert_eq!(
            delete_user(user.id, &connection),
            Err(Error::CustomerNotFound)
        );
    }
}

#[cfg(test)]
mod bank_account_tests {
    use crate::{
        Error,
        test_utils::{must_create_account, must_create_customer, must_create_test_connection},
    };

    use super::{
        AccountStatus, AccountType, NewBankAccount, count_accounts_by_status, create_bank_account,
        delete_user, get_account_with_owner, get_all_accounts_with_owner, get_bank_account,
        get_bank_accounts_for_user, set_account_status,
    };

    #[test]
    fn create_bank_account_opens_with_zero_balance() {
        let connection = must_create_test_connection();
        let user = must_create_customer(&connection, "jane@example.com");

        let account = create_bank_account(
            NewBankAccount {
                user_id: user.id,
                account_name: "Everyday".to_owned(),
                account_number: "12-3456-7890123-00".to_owned(),
                account_type: AccountType::Checking,
                status: AccountStatus::PendingApproval,
                currency: "NZD".to_owned(),
            },
            &connection,
        )
        .unwrap();

        assert_eq!(account.user_id, user.id);
        assert_eq!(account.balance.to_string(), "0.00");
        assert_eq!(account.available_balance.to_string(), "0.00");
        assert_eq!(account.currency, "NZD");
        assert_eq!(account.last_activity_at, None);
    }

    #[test]
    fn create_bank_account_for_missing_user_fails() {
        let connection = must_create_test_connection();

        let result = create_bank_account(
            NewBankAccount {
                user_id: 42,
                account_name: "Everyday".to_owned(),
                account_number: "0001".to_owned(),
                account_type: AccountType::Savings,
                status: AccountStatus::Active,
                currency: "USD".to_owned(),
            },
            &connection,
        );

        assert_eq!(result, Err(Error::CustomerNotFound));
    }

    #[test]
    fn get_bank_accounts_for_user_only_returns_their_accounts() {
        let connection = must_create_test_connection();
        let jane = must_create_customer(&connection, "jane@example.com");
        let john = must_create_customer(&connection, "john@example.com");
        let first = must_create_account(&connection, jane.id, "0001");
        let second = must_create_account(&connection, jane.id, "0002");
        must_create_account(&connection, john.id, "0003");

        let accounts = get_bank_accounts_for_user(jane.id, &connection).unwrap();

        assert_eq!(accounts, [first, second]);
    }

    #[test]
    fn account_with_owner_includes_contact_details() {
        let connection = must_create_test_connection();
        let jane = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, jane.id, "0001");

        let got = get_account_with_owner(account.id, &connection).unwrap();

        assert_eq!(got.account, account);
        assert_eq!(got.user.id, jane.id);
        assert_eq!(got.user.name, jane.full_name());
        assert_eq!(got.user.email, "jane@example.com");
        assert_eq!(
            get_all_accounts_with_owner(&connection).unwrap(),
            [got.clone()]
        );
    }

    #[test]
    fn set_account_status_updates_status() {
        let connection = must_create_test_connection();
        let jane = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, jane.id, "0001");

        let updated = set_account_status(account.id, AccountStatus::Suspended, &connection).unwrap();

        assert_eq!(updated.status, AccountStatus::Suspended);
        assert_eq!(get_bank_account(account.id, &connection), Ok(updated));
    }

    #[test]
    fn set_status_of_missing_account_fails() {
        let connection = must_create_test_connection();

        assert_eq!(
            set_account_status(5, AccountStatus::Active, &connection),
            Err(Error::BankAccountNotFound)
        );
    }

    #[test]
    fn deleting_user_deletes_their_accounts() {
        let connection = must_create_test_connection();
        let jane = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, jane.id, "0001");

        delete_user(jane.id, &connection).unwrap();

        assert_eq!(
            get_bank_account(account.id, &connection),
            Err(Error::BankAccountNotFound)
        );
    }

    #[test]
    fn counts_accounts_by_status() {
        let connection = must_create_test_connection();
        let jane = must_create_customer(&connection, "jane@example.com");
        let active = must_create_account(&connection, jane.id, "0001");
        let pending = must_create_account(&connection, jane.id, "0002");
        set_account_status(pending.id, AccountStatus::PendingApproval, &connection).unwrap();
        let closed = must_create_account(&connection, jane.id, "0003");
        set_account_status(closed.id, AccountStatus::Closed, &connection).unwrap();

        let accounts = get_bank_accounts_for_user(jane.id, &connection).unwrap();
        let stats = count_accounts_by_status(&accounts);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.pending_approval, 1);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.suspended, 0);
        assert_eq!(active.status, AccountStatus::Active);
    }
}
