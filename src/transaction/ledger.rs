//! The ledger writer.
//!
//! Every change to a balance goes through this module. Each operation runs in
//! a single `BEGIN IMMEDIATE` transaction so that an account's `balance` and
//! `available_balance`, its owner's `total_balance` and the transaction
//! history are either all updated or not updated at all. Balances are changed
//! with SQL increments, never by writing back a value read earlier.

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::AdminId,
    customer::{
        BankAccount, BankAccountId, User, UserId, get_bank_account, get_bank_accounts_for_user,
        get_user,
    },
    money::{from_minor_units, positive_minor_units, to_minor_units},
    transaction::{
        audit::{AuditAction, NewAuditLogEntry, create_audit_log_entry},
        core::{
            ApprovalStatus, TRANSACTION_COLUMNS, Transaction, TransactionId, TransactionStatus,
            TransactionType, create_transaction, get_transaction, map_transaction_row,
        },
    },
};

/// The description given to deposits made through [add_funds].
pub const ADD_FUNDS_DESCRIPTION: &str = "Funds added by admin";

/// The result of [add_funds].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundsAdded {
    /// The account after the deposit.
    pub bank_account: BankAccount,
    /// The owner of the account after the deposit.
    pub customer: User,
    /// The deposit that records the change.
    pub transaction: Transaction,
}

/// The result of [reject_transaction].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// The rejected transaction.
    pub transaction: Transaction,
    /// The refund that returned the money to the customer.
    pub refund: Transaction,
}

/// Changes to the display details of a pending transaction.
///
/// Fields left as `None` are not changed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEdit {
    /// A new description.
    pub description: Option<String>,
    /// A new reference.
    pub reference: Option<String>,
    /// A new recipient name.
    pub recipient_name: Option<String>,
    /// A new recipient account number.
    pub recipient_account: Option<String>,
    /// A new recipient bank.
    pub recipient_bank: Option<String>,
    /// A new category.
    pub category: Option<String>,
}

impl TransactionEdit {
    /// The names of the fields that will be changed, in camelCase.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("description", &self.description),
            ("reference", &self.reference),
            ("recipientName", &self.recipient_name),
            ("recipientAccount", &self.recipient_account),
            ("recipientBank", &self.recipient_bank),
            ("category", &self.category),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|_| name))
        .collect()
    }
}

/// A comparison of a customer's stored total balance with the sum of their
/// account balances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// The customer that was checked.
    pub user_id: UserId,
    /// The `totalBalance` stored on the customer.
    pub stored_total: Decimal,
    /// The sum of the balances of the customer's accounts.
    pub computed_total: Decimal,
    /// `stored_total - computed_total`.
    pub drift: Decimal,
    /// Whether the stored total matches the sum of the account balances.
    pub consistent: bool,
}

/// Deposit `amount` into one of a customer's bank accounts.
///
/// If `bank_account_id` is `None` the customer's only account is used.
///
/// The account's balance and available balance, the customer's total balance,
/// and a completed deposit are written together or not at all.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `amount` is not positive or has more than two decimal places,
/// - [Error::CustomerNotFound] if the customer does not exist,
/// - [Error::BankAccountNotFound] if the account does not exist, belongs to
///   another customer, or the customer has no accounts,
/// - [Error::InvalidRequest] if `bank_account_id` is `None` and the customer
///   has more than one account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn add_funds(
    user_id: UserId,
    bank_account_id: Option<BankAccountId>,
    amount: Decimal,
    now: OffsetDateTime,
    connection: &mut Connection,
) -> Result<FundsAdded, Error> {
    let minor_units = positive_minor_units(amount)?;

    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    get_user(user_id, &transaction)?;

    let account = match bank_account_id {
        Some(id) => {
            let account = get_bank_account(id, &transaction)?;

            if account.user_id != user_id {
                return Err(Error::BankAccountNotFound);
            }

            account
        }
        None => {
            let mut accounts = get_bank_accounts_for_user(user_id, &transaction)?;

            match accounts.len() {
                0 => return Err(Error::BankAccountNotFound),
                1 => accounts.remove(0),
                count => {
                    return Err(Error::InvalidRequest(format!(
                        "the customer has {count} bank accounts, specify bankAccountId"
                    )));
                }
            }
        }
    };

    credit_account(&account, minor_units, now, &transaction)?;

    let deposit = create_transaction(
        Transaction::build(TransactionType::Deposit, from_minor_units(minor_units))
            .account(user_id, account.id)
            .completed(now)
            .currency(&account.currency)
            .description(ADD_FUNDS_DESCRIPTION),
        now,
        &transaction,
    )?;

    let funds_added = FundsAdded {
        bank_account: get_bank_account(account.id, &transaction)?,
        customer: get_user(user_id, &transaction)?,
        transaction: deposit,
    };

    transaction.commit()?;

    tracing::info!(
        "Added {} to bank account {} of customer {}",
        funds_added.transaction.amount,
        account.id,
        user_id
    );

    Ok(funds_added)
}

/// Approve a pending transaction.
///
/// The transaction becomes COMPLETED and APPROVED. Balances are not changed,
/// since pending transactions have already been applied to the account.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if the transaction does not exist,
/// - [Error::TransactionNotPending] if the transaction was already approved or rejected,
/// - [Error::MissingLedgerLink] if the transaction is not linked to a customer and an account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn approve_transaction(
    id: TransactionId,
    admin_id: AdminId,
    notes: Option<&str>,
    now: OffsetDateTime,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let pending = get_pending_transaction(id, &transaction)?;
    ledger_link(&pending)?;

    let approved = finish_review(
        id,
        TransactionStatus::Completed,
        ApprovalStatus::Approved,
        now,
        &transaction,
    )?;

    create_audit_log_entry(
        NewAuditLogEntry {
            transaction_id: id,
            admin_id,
            action: AuditAction::Approve,
            previous_status: TransactionStatus::Pending,
            new_status: TransactionStatus::Completed,
            notes: Some(notes.unwrap_or("Approved by admin")),
        },
        now,
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!("Admin {admin_id} approved transaction {id}");

    Ok(approved)
}

/// Reject a pending transaction and refund the customer.
///
/// The transaction becomes FAILED and REJECTED, `amount + fee` is credited back
/// to the account and its owner, and a completed REFUND of `amount` is recorded.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if the transaction does not exist,
/// - [Error::TransactionNotPending] if the transaction was already approved or rejected,
/// - [Error::MissingLedgerLink] if the transaction is not linked to a customer and an account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn reject_transaction(
    id: TransactionId,
    admin_id: AdminId,
    notes: Option<&str>,
    now: OffsetDateTime,
    connection: &mut Connection,
) -> Result<Rejection, Error> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let pending = get_pending_transaction(id, &transaction)?;
    let (user_id, account_id) = ledger_link(&pending)?;
    let credit = to_minor_units(pending.amount)?
        .checked_add(to_minor_units(pending.fee)?)
        .ok_or_else(|| Error::InvalidAmount("the refund is too large".to_owned()))?;

    let rejected = finish_review(
        id,
        TransactionStatus::Failed,
        ApprovalStatus::Rejected,
        now,
        &transaction,
    )?;

    let account = get_bank_account(account_id, &transaction)?;
    if account.user_id != user_id {
        return Err(Error::BankAccountNotFound);
    }
    credit_account(&account, credit, now, &transaction)?;

    let refund = create_transaction(
        Transaction::build(TransactionType::Refund, pending.amount)
            .account(user_id, account_id)
            .completed(now)
            .currency(&pending.currency)
            .description(&format!("Refund for rejected transaction {id}")),
        now,
        &transaction,
    )?;

    create_audit_log_entry(
        NewAuditLogEntry {
            transaction_id: id,
            admin_id,
            action: AuditAction::Reject,
            previous_status: TransactionStatus::Pending,
            new_status: TransactionStatus::Failed,
            notes: Some(notes.unwrap_or("Rejected by admin")),
        },
        now,
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!(
        "Admin {admin_id} rejected transaction {id}, refunded {} to bank account {account_id}",
        from_minor_units(credit)
    );

    Ok(Rejection {
        transaction: rejected,
        refund,
    })
}

/// Change the display details of a pending transaction.
///
/// Amounts and statuses are never changed.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidBody] if `edit` does not change anything,
/// - [Error::TransactionNotFound] if the transaction does not exist,
/// - [Error::TransactionNotPending] if the transaction was already approved or rejected,
/// - [Error::SqlError] if there is some other SQL error.
pub fn edit_transaction(
    id: TransactionId,
    admin_id: AdminId,
    edit: TransactionEdit,
    notes: Option<&str>,
    now: OffsetDateTime,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let changed_fields = edit.changed_fields();
    if changed_fields.is_empty() {
        return Err(Error::InvalidBody(
            "an edit must change at least one of description, reference, recipientName, \
            recipientAccount, recipientBank or category"
                .to_owned(),
        ));
    }

    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    get_pending_transaction(id, &transaction)?;

    let edited = transaction
        .query_row(
            &format!(
                "UPDATE \"transaction\" SET
                    description = COALESCE(?1, description),
                    reference = COALESCE(?2, reference),
                    recipient_name = COALESCE(?3, recipient_name),
                    recipient_account = COALESCE(?4, recipient_account),
                    recipient_bank = COALESCE(?5, recipient_bank),
                    category = COALESCE(?6, category),
                    updated_at = ?7
                WHERE id = ?8 AND status = 'PENDING'
                RETURNING {TRANSACTION_COLUMNS}"
            ),
            rusqlite::params![
                edit.description,
                edit.reference,
                edit.recipient_name,
                edit.recipient_account,
                edit.recipient_bank,
                edit.category,
                now,
                id,
            ],
            map_transaction_row,
        )
        .optional()?;

    let Some(edited) = edited else {
        return Err(not_pending_error(id, &transaction));
    };

    let summary = format!("Edited {}", changed_fields.join(", "));
    create_audit_log_entry(
        NewAuditLogEntry {
            transaction_id: id,
            admin_id,
            action: AuditAction::Edit,
            previous_status: TransactionStatus::Pending,
            new_status: TransactionStatus::Pending,
            notes: Some(notes.unwrap_or(&summary)),
        },
        now,
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!("Admin {admin_id} edited transaction {id}: {summary}");

    Ok(edited)
}

/// Delete a bank account along with its transactions, and take its balance
/// off the owner's total balance.
///
/// Returns the deleted account.
///
/// # Errors
/// Returns [Error::BankAccountNotFound] if the account does not exist.
pub fn delete_bank_account(
    id: BankAccountId,
    connection: &mut Connection,
) -> Result<BankAccount, Error> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let account = get_bank_account(id, &transaction)?;
    let balance = to_minor_units(account.balance)?;

    transaction.execute(
        "UPDATE user SET total_balance = total_balance - ?1 WHERE id = ?2",
        (balance, account.user_id),
    )?;
    transaction.execute("DELETE FROM bank_account WHERE id = ?1", (id,))?;

    transaction.commit()?;

    tracing::info!(
        "Deleted bank account {id} of customer {} with balance {}",
        account.user_id,
        account.balance
    );

    Ok(account)
}

/// Compare a customer's stored total balance with the sum of their account balances.
///
/// # Errors
/// Returns [Error::CustomerNotFound] if the customer does not exist.
pub fn reconcile_user_balance(
    user_id: UserId,
    connection: &Connection,
) -> Result<Reconciliation, Error> {
    let (stored, computed): (i64, i64) = connection
        .query_row(
            "SELECT u.total_balance, COALESCE(SUM(a.balance), 0)
            FROM user u
            LEFT JOIN bank_account a ON a.user_id = u.id
            WHERE u.id = ?1
            GROUP BY u.id",
            (user_id,),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or(Error::CustomerNotFound)?;

    let stored_total = from_minor_units(stored);
    let computed_total = from_minor_units(computed);

    if stored != computed {
        tracing::warn!(
            "Customer {user_id} has a stored total balance of {stored_total} but their accounts sum to {computed_total}"
        );
    }

    Ok(Reconciliation {
        user_id,
        stored_total,
        computed_total,
        drift: stored_total - computed_total,
        consistent: stored == computed,
    })
}

/// Credit `minor_units` to `account` and its owner, and stamp the account's last activity.
fn credit_account(
    account: &BankAccount,
    minor_units: i64,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let (balance, available_balance, total_balance): (i64, i64, i64) = connection.query_row(
        "SELECT a.balance, a.available_balance, u.total_balance
        FROM bank_account a
        INNER JOIN user u ON u.id = a.user_id
        WHERE a.id = ?1",
        (account.id,),
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    // SQLite silently switches to floating point when an integer overflows.
    let fits = [balance, available_balance, total_balance]
        .into_iter()
        .all(|current| current.checked_add(minor_units).is_some());
    if !fits {
        return Err(Error::InvalidAmount(format!(
            "{} would overflow the balance",
            from_minor_units(minor_units)
        )));
    }

    connection.execute(
        "UPDATE bank_account
        SET balance = balance + ?1,
            available_balance = available_balance + ?1,
            last_activity_at = ?2
        WHERE id = ?3",
        (minor_units, now, account.id),
    )?;
    connection.execute(
        "UPDATE user SET total_balance = total_balance + ?1 WHERE id = ?2",
        (minor_units, account.user_id),
    )?;

    Ok(())
}

fn get_pending_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = get_transaction(id, connection)?;

    match transaction.status {
        TransactionStatus::Pending => Ok(transaction),
        status => Err(Error::TransactionNotPending(status)),
    }
}

fn ledger_link(transaction: &Transaction) -> Result<(UserId, BankAccountId), Error> {
    match (transaction.user_id, transaction.bank_account_id) {
        (Some(user_id), Some(bank_account_id)) => Ok((user_id, bank_account_id)),
        _ => Err(Error::MissingLedgerLink(transaction.id)),
    }
}

/// Move a transaction out of PENDING. Fails if it is no longer PENDING.
fn finish_review(
    id: TransactionId,
    status: TransactionStatus,
    approval_status: ApprovalStatus,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let completion_date = match status {
        TransactionStatus::Completed => Some(now),
        _ => None,
    };

    let reviewed = connection
        .query_row(
            &format!(
                "UPDATE \"transaction\" SET
                    status = ?1,
                    admin_approval_status = ?2,
                    approval_date = ?3,
                    completion_date = ?4,
                    updated_at = ?3
                WHERE id = ?5 AND status = 'PENDING'
                RETURNING {TRANSACTION_COLUMNS}"
            ),
            (status, approval_status, now, completion_date, id),
            map_transaction_row,
        )
        .optional()?;

    reviewed.ok_or_else(|| not_pending_error(id, connection))
}

fn not_pending_error(id: TransactionId, connection: &Connection) -> Error {
    match get_transaction(id, connection) {
        Ok(transaction) => Error::TransactionNotPending(transaction.status),
        Err(error) => error,
    }
}

#[cfg(test)]
mod ledger_tests {
    use rust_decimal_macros::dec;
    use time::OffsetDateTime;

    use crate::{
        Error,
        customer::{get_bank_account, get_user},
        test_utils::{
            must_create_account, must_create_admin, must_create_customer,
            must_create_pending_transaction, must_create_test_connection,
        },
        transaction::{
            audit::{AuditAction, get_audit_log},
            core::{
                ApprovalStatus, Transaction, TransactionStatus, TransactionType,
                count_transactions, create_transaction, get_transaction,
            },
        },
    };

    use super::{
        ADD_FUNDS_DESCRIPTION, TransactionEdit, add_funds, approve_transaction,
        delete_bank_account, edit_transaction, reconcile_user_balance, reject_transaction,
    };

    fn count_of_type(transaction_type: TransactionType, connection: &rusqlite::Connection) -> i64 {
        connection
            .query_row(
                "SELECT COUNT(*) FROM \"transaction\" WHERE transaction_type = ?1",
                (transaction_type,),
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn add_funds_updates_account_owner_and_history() {
        let mut connection = must_create_test_connection();
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let now = OffsetDateTime::now_utc();

        let result = add_funds(
            customer.id,
            Some(account.id),
            dec!(12.5),
            now,
            &mut connection,
        )
        .unwrap();

        assert_eq!(result.bank_account.balance, dec!(12.50));
        assert_eq!(result.bank_account.available_balance, dec!(12.50));
        assert_eq!(result.bank_account.last_activity_at, Some(now));
        assert_eq!(result.customer.total_balance, dec!(12.50));
        assert_eq!(result.transaction.transaction_type, TransactionType::Deposit);
        assert_eq!(result.transaction.amount, dec!(12.50));
        assert_eq!(result.transaction.fee, dec!(0));
        assert_eq!(result.transaction.status, TransactionStatus::Completed);
        assert_eq!(
            result.transaction.admin_approval_status,
            ApprovalStatus::Approved
        );
        assert_eq!(
            result.transaction.description.as_deref(),
            Some(ADD_FUNDS_DESCRIPTION)
        );
        assert_eq!(count_transactions(None, &connection), Ok(1));
    }

    #[test]
    fn add_funds_uses_only_account_when_none_given() {
        let mut connection = must_create_test_connection();
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");

        let result = add_funds(
            customer.id,
            None,
            dec!(5),
            OffsetDateTime::now_utc(),
            &mut connection,
        )
        .unwrap();

        assert_eq!(result.bank_account.id, account.id);
        assert_eq!(result.bank_account.balance, dec!(5));
    }

    #[test]
    fn add_funds_without_account_requires_single_account() {
        let mut connection = must_create_test_connection();
        let customer = must_create_customer(&connection, "jane@example.com");
        let now = OffsetDateTime::now_utc();

        assert_eq!(
            add_funds(customer.id, None, dec!(5), now, &mut connection),
            Err(Error::BankAccountNotFound)
        );

        must_create_account(&connection, customer.id, "0001");
        must_create_account(&connection, customer.id, "0002");

        let result = add_funds(customer.id, None, dec!(5), now, &mut connection);

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert_eq!(count_transactions(None, &connection), Ok(0));
    }

    #[test]
    fn add_funds_rejects_invalid_amounts_without_changes() {
        let mut connection = must_create_test_connection();
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let now = OffsetDateTime::now_utc();

        for amount in [dec!(0), dec!(-10), dec!(1.001)] {
            let result = add_funds(customer.id, Some(account.id), amount, now, &mut connection);

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "want invalid amount for {amount}, got {result:?}"
            );
        }

        assert_eq!(get_bank_account(account.id, &connection), Ok(account));
        assert_eq!(get_user(customer.id, &connection), Ok(customer));
        assert_eq!(count_transactions(None, &connection), Ok(0));
    }

    #[test]
    fn add_funds_to_unknown_customer_or_account_is_not_found() {
        let mut connection = must_create_test_connection();
        let jane = must_create_customer(&connection, "jane@example.com");
        let john = must_create_customer(&connection, "john@example.com");
        let johns_account = must_create_account(&connection, john.id, "0001");
        let now = OffsetDateTime::now_utc();

        assert_eq!(
            add_funds(999, None, dec!(5), now, &mut connection),
            Err(Error::CustomerNotFound)
        );
        assert_eq!(
            add_funds(jane.id, Some(999), dec!(5), now, &mut connection),
            Err(Error::BankAccountNotFound)
        );
        assert_eq!(
            add_funds(jane.id, Some(johns_account.id), dec!(5), now, &mut connection),
            Err(Error::BankAccountNotFound)
        );

        assert_eq!(
            get_bank_account(johns_account.id, &connection),
            Ok(johns_account)
        );
        assert_eq!(count_transactions(None, &connection), Ok(0));
    }

    #[test]
    fn approve_completes_without_changing_balances() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let now = OffsetDateTime::now_utc();
        add_funds(customer.id, Some(account.id), dec!(100), now, &mut connection).unwrap();
        let pending = must_create_pending_transaction(&connection, &account, dec!(20), dec!(1));
        let account_before = get_bank_account(account.id, &connection).unwrap();
        let customer_before = get_user(customer.id, &connection).unwrap();

        let approved =
            approve_transaction(pending.id, admin.id, None, now, &mut connection).unwrap();

        assert_eq!(approved.status, TransactionStatus::Completed);
        assert_eq!(approved.admin_approval_status, ApprovalStatus::Approved);
        assert_eq!(approved.approval_date, Some(now));
        assert_eq!(approved.completion_date, Some(now));
        assert_eq!(get_bank_account(account.id, &connection), Ok(account_before));
        assert_eq!(get_user(customer.id, &connection), Ok(customer_before));

        let log = get_audit_log(pending.id, &connection).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, AuditAction::Approve);
        assert_eq!(log[0].previous_status, TransactionStatus::Pending);
        assert_eq!(log[0].new_status, TransactionStatus::Completed);
        assert_eq!(log[0].admin_id, Some(admin.id));
    }

    #[test]
    fn reviewing_twice_is_a_conflict() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let pending = must_create_pending_transaction(&connection, &account, dec!(20), dec!(1));
        let now = OffsetDateTime::now_utc();
        approve_transaction(pending.id, admin.id, None, now, &mut connection).unwrap();
        let account_before = get_bank_account(account.id, &connection).unwrap();

        assert_eq!(
            approve_transaction(pending.id, admin.id, None, now, &mut connection),
            Err(Error::TransactionNotPending(TransactionStatus::Completed))
        );
        assert_eq!(
            reject_transaction(pending.id, admin.id, None, now, &mut connection),
            Err(Error::TransactionNotPending(TransactionStatus::Completed))
        );

        assert_eq!(get_bank_account(account.id, &connection), Ok(account_before));
        assert_eq!(count_of_type(TransactionType::Refund, &connection), 0);
        assert_eq!(get_audit_log(pending.id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn reject_twice_refunds_once() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let pending = must_create_pending_transaction(&connection, &account, dec!(20), dec!(1));
        let now = OffsetDateTime::now_utc();
        reject_transaction(pending.id, admin.id, None, now, &mut connection).unwrap();

        assert_eq!(
            reject_transaction(pending.id, admin.id, None, now, &mut connection),
            Err(Error::TransactionNotPending(TransactionStatus::Failed))
        );

        assert_eq!(count_of_type(TransactionType::Refund, &connection), 1);
        assert_eq!(
            get_bank_account(account.id, &connection).unwrap().balance,
            dec!(21)
        );
    }

    #[test]
    fn review_of_missing_transaction_is_not_found() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let now = OffsetDateTime::now_utc();

        assert_eq!(
            approve_transaction(42, admin.id, None, now, &mut connection),
            Err(Error::TransactionNotFound)
        );
        assert_eq!(
            reject_transaction(42, admin.id, None, now, &mut connection).map(|_| ()),
            Err(Error::TransactionNotFound)
        );
    }

    #[test]
    fn review_of_unlinked_transaction_is_rejected_without_changes() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let now = OffsetDateTime::now_utc();
        let unlinked = create_transaction(
            Transaction::build(TransactionType::Withdrawal, dec!(20)),
            now,
            &connection,
        )
        .unwrap();

        assert_eq!(
            approve_transaction(unlinked.id, admin.id, None, now, &mut connection),
            Err(Error::MissingLedgerLink(unlinked.id))
        );
        assert_eq!(
            reject_transaction(unlinked.id, admin.id, None, now, &mut connection).map(|_| ()),
            Err(Error::MissingLedgerLink(unlinked.id))
        );

        assert_eq!(get_transaction(unlinked.id, &connection), Ok(unlinked.clone()));
        assert_eq!(get_audit_log(unlinked.id, &connection), Ok(vec![]));
        assert_eq!(count_transactions(None, &connection), Ok(1));
    }

    #[test]
    fn add_then_reject_scenario() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let now = OffsetDateTime::now_utc();
        add_funds(customer.id, Some(account.id), dec!(100.00), now, &mut connection).unwrap();

        let funded =
            add_funds(customer.id, Some(account.id), dec!(50), now, &mut connection).unwrap();
        assert_eq!(funded.bank_account.balance.to_string(), "150.00");
        assert_eq!(funded.customer.total_balance.to_string(), "150.00");

        let pending = must_create_pending_transaction(&connection, &account, dec!(20), dec!(1));
        let rejection = reject_transaction(
            pending.id,
            admin.id,
            Some("Suspicious recipient"),
            now,
            &mut connection,
        )
        .unwrap();

        let account = get_bank_account(account.id, &connection).unwrap();
        let customer = get_user(customer.id, &connection).unwrap();
        assert_eq!(account.balance.to_string(), "171.00");
        assert_eq!(account.available_balance.to_string(), "171.00");
        assert_eq!(customer.total_balance.to_string(), "171.00");

        assert_eq!(rejection.transaction.status, TransactionStatus::Failed);
        assert_eq!(
            rejection.transaction.admin_approval_status,
            ApprovalStatus::Rejected
        );
        assert_eq!(rejection.transaction.completion_date, None);
        assert_eq!(rejection.refund.transaction_type, TransactionType::Refund);
        assert_eq!(rejection.refund.amount, dec!(20));
        assert_eq!(rejection.refund.fee, dec!(0));
        assert_eq!(rejection.refund.status, TransactionStatus::Completed);
        assert_eq!(rejection.refund.bank_account_id, Some(account.id));
        assert_eq!(count_of_type(TransactionType::Refund, &connection), 1);

        let log = get_audit_log(pending.id, &connection).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, AuditAction::Reject);
        assert_eq!(log[0].previous_status, TransactionStatus::Pending);
        assert_eq!(log[0].new_status, TransactionStatus::Failed);
        assert_eq!(log[0].notes.as_deref(), Some("Suspicious recipient"));

        assert!(reconcile_user_balance(customer.id, &connection).unwrap().consistent);
    }

    #[test]
    fn edit_changes_only_given_fields() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let pending = must_create_pending_transaction(&connection, &account, dec!(20), dec!(1));
        let now = OffsetDateTime::now_utc();

        let edited = edit_transaction(
            pending.id,
            admin.id,
            TransactionEdit {
                description: Some("Power bill".to_owned()),
                category: Some("Utilities".to_owned()),
                ..Default::default()
            },
            None,
            now,
            &mut connection,
        )
        .unwrap();

        assert_eq!(edited.description.as_deref(), Some("Power bill"));
        assert_eq!(edited.category.as_deref(), Some("Utilities"));
        assert_eq!(edited.reference, pending.reference);
        assert_eq!(edited.amount, pending.amount);
        assert_eq!(edited.status, TransactionStatus::Pending);
        assert_eq!(edited.updated_at, now);

        let log = get_audit_log(pending.id, &connection).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, AuditAction::Edit);
        assert_eq!(log[0].notes.as_deref(), Some("Edited description, category"));
    }

    #[test]
    fn empty_edit_is_invalid() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let pending = must_create_pending_transaction(&connection, &account, dec!(20), dec!(1));

        let result = edit_transaction(
            pending.id,
            admin.id,
            TransactionEdit::default(),
            None,
            OffsetDateTime::now_utc(),
            &mut connection,
        );

        assert!(matches!(result, Err(Error::InvalidBody(_))));
    }

    #[test]
    fn edit_of_completed_transaction_is_a_conflict() {
        let mut connection = must_create_test_connection();
        let admin = must_create_admin(&connection, "ada@bank.test");
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        let pending = must_create_pending_transaction(&connection, &account, dec!(20), dec!(1));
        let now = OffsetDateTime::now_utc();
        approve_transaction(pending.id, admin.id, None, now, &mut connection).unwrap();

        let result = edit_transaction(
            pending.id,
            admin.id,
            TransactionEdit {
                description: Some("Too late".to_owned()),
                ..Default::default()
            },
            None,
            now,
            &mut connection,
        );

        assert_eq!(
            result,
            Err(Error::TransactionNotPending(TransactionStatus::Completed))
        );
    }

    #[test]
    fn delete_bank_account_reduces_owner_total() {
        let mut connection = must_create_test_connection();
        let customer = must_create_customer(&connection, "jane@example.com");
        let kept = must_create_account(&connection, customer.id, "0001");
        let deleted = must_create_account(&connection, customer.id, "0002");
        let now = OffsetDateTime::now_utc();
        add_funds(customer.id, Some(kept.id), dec!(30), now, &mut connection).unwrap();
        add_funds(customer.id, Some(deleted.id), dec!(70), now, &mut connection).unwrap();

        let account = delete_bank_account(deleted.id, &mut connection).unwrap();

        assert_eq!(account.balance, dec!(70));
        assert_eq!(
            get_bank_account(deleted.id, &connection),
            Err(Error::BankAccountNotFound)
        );
        assert_eq!(
            get_user(customer.id, &connection).unwrap().total_balance,
            dec!(30)
        );
        assert_eq!(count_transactions(None, &connection), Ok(1));

        let reconciliation = reconcile_user_balance(customer.id, &connection).unwrap();
        assert!(reconciliation.consistent);
        assert_eq!(reconciliation.drift, dec!(0));
    }

    #[test]
    fn delete_missing_bank_account_is_not_found() {
        let mut connection = must_create_test_connection();

        assert_eq!(
            delete_bank_account(7, &mut connection),
            Err(Error::BankAccountNotFound)
        );
    }

    #[test]
    fn reconciliation_reports_drift() {
        let mut connection = must_create_test_connection();
        let customer = must_create_customer(&connection, "jane@example.com");
        let account = must_create_account(&connection, customer.id, "0001");
        add_funds(
            customer.id,
            Some(account.id),
            dec!(10),
            OffsetDateTime::now_utc(),
            &mut connection,
        )
        .unwrap();
        connection
            .execute(
                "UPDATE user SET total_balance = total_balance + 250 WHERE id = ?1",
                (customer.id,),
            )
            .unwrap();

        let reconciliation = reconcile_user_balance(customer.id, &connection).unwrap();

        assert!(!reconciliation.consistent);
        assert_eq!(reconciliation.stored_total, dec!(12.50));
        assert_eq!(reconciliation.computed_total, dec!(10));
        assert_eq!(reconciliation.drift, dec!(2.50));
    }

    #[test]
    fn reconciliation_of_customer_without_accounts_is_consistent() {
        let connection = must_create_test_connection();
        let customer = must_create_customer(&connection, "jane@example.com");

        let reconciliation = reconcile_user_balance(customer.id, &connection).unwrap();

        assert!(reconciliation.consistent);
        assert_eq!(reconciliation.computed_total, dec!(0));
        assert_eq!(
            reconcile_user_balance(999, &connection),
            Err(Error::CustomerNotFound)
        );
    }
}
