//! Helpers shared by the test modules.

#![allow(missing_docs)]

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState,
    auth::{Admin, AdminRole, COOKIE_SESSION, NewAdmin, create_admin},
    config::RuntimeMode,
    customer::{
        AccountStatus, AccountType, BankAccount, NewBankAccount, NewUser, User, UserId,
        create_bank_account, create_user,
    },
    db::{initialize, lock_connection},
    endpoints,
    pagination::PaginationConfig,
    password::{PasswordHash, ValidatedPassword},
    transaction::{Transaction, TransactionType, create_transaction},
};

/// The lowest cost bcrypt accepts, so tests stay fast.
const TEST_HASH_COST: u32 = 4;

#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory database.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

#[track_caller]
pub(crate) fn get_test_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not open in-memory database."),
        "42",
        RuntimeMode::Development,
        PaginationConfig::default(),
    )
    .expect("Could not create app state.")
}

#[track_caller]
pub(crate) fn must_create_admin_with_password(
    connection: &Connection,
    email: &str,
    password: &str,
) -> Admin {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(password), TEST_HASH_COST)
        .expect("Could not hash password.");

    create_admin(
        NewAdmin {
            email: email.to_owned(),
            password_hash,
            first_name: "Test".to_owned(),
            last_name: "Admin".to_owned(),
            role: AdminRole::Admin,
        },
        connection,
    )
    .expect("Could not create test admin.")
}

#[track_caller]
pub(crate) fn must_create_admin(connection: &Connection, email: &str) -> Admin {
    must_create_admin_with_password(connection, email, "correct horse battery")
}

#[track_caller]
pub(crate) fn insert_test_admin(state: &AppState, email: &str, password: &str) -> Admin {
    let connection = lock_connection(&state.db_connection).expect("Could not lock database.");

    must_create_admin_with_password(&connection, email, password)
}

#[track_caller]
pub(crate) fn must_create_customer(connection: &Connection, email: &str) -> User {
    create_user(
        NewUser {
            first_name: "Test".to_owned(),
            last_name: "Customer".to_owned(),
            email: email.to_owned(),
            phone_number: None,
            is_verified: true,
        },
        connection,
    )
    .expect("Could not create test customer.")
}

#[track_caller]
pub(crate) fn must_create_account(
    connection: &Connection,
    user_id: UserId,
    account_number: &str,
) -> BankAccount {
    create_bank_account(
        NewBankAccount {
            user_id,
            account_name: format!("Account {account_number}"),
            account_number: account_number.to_owned(),
            account_type: AccountType::Checking,
            status: AccountStatus::Active,
            currency: "USD".to_owned(),
        },
        connection,
    )
    .expect("Could not create test bank account.")
}

/// Create a pending withdrawal from `account` without touching any balances.
#[track_caller]
pub(crate) fn must_create_pending_transaction(
    connection: &Connection,
    account: &BankAccount,
    amount: Decimal,
    fee: Decimal,
) -> Transaction {
    create_transaction(
        Transaction::build(TransactionType::Withdrawal, amount)
            .fee(fee)
            .account(account.user_id, account.id)
            .currency(&account.currency)
            .description("Card payment"),
        OffsetDateTime::now_utc(),
        connection,
    )
    .expect("Could not create test transaction.")
}

/// Log in through the API and return the session cookie.
pub(crate) async fn log_in(server: &TestServer, email: &str, password: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({"email": email, "password": password}))
        .await;

    response.assert_status_ok();

    response.cookie(COOKIE_SESSION)
}
