//! Route handlers for bank accounts, addressed by bank account ID.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, MessageBody,
    customer::core::{
        AccountStats, AccountStatus, AccountWithOwner, BankAccount, count_accounts_by_status,
        get_account_with_owner, get_all_accounts_with_owner, set_account_status,
    },
    db::lock_connection,
    extract::{IdPath, JsonBody},
    transaction::delete_bank_account,
};

/// The state needed to manage customers and their accounts.
#[derive(Debug, Clone)]
pub struct CustomerState {
    /// The database connection for customers and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CustomerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    customers: Vec<AccountWithOwner>,
    stats: AccountStats,
}

/// List every bank account with its owner, along with counts by status.
pub async fn get_customers_endpoint(
    State(state): State<CustomerState>,
) -> Result<Json<CustomersResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let customers = get_all_accounts_with_owner(&connection)?;
    let stats = count_accounts_by_status(customers.iter().map(|customer| &customer.account));

    Ok(Json(CustomersResponse { customers, stats }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccountResponse {
    bank_account: AccountWithOwner,
}

/// Get one bank account with its owner.
pub async fn get_customer_account_endpoint(
    State(state): State<CustomerState>,
    IdPath(account_id): IdPath,
) -> Result<Json<CustomerAccountResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account_with_owner(account_id, &connection)
        .map(|bank_account| Json(CustomerAccountResponse { bank_account }))
}

/// The body of a request to change an account's status.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountActionRequest {
    action: String,
}

#[derive(Debug, Serialize)]
pub struct AccountActionResponse {
    message: String,
    account: BankAccount,
}

/// Approve (`ACTIVE`) or suspend (`SUSPENDED`) a bank account.
pub async fn update_account_status_endpoint(
    State(state): State<CustomerState>,
    IdPath(account_id): IdPath,
    JsonBody(request): JsonBody<AccountActionRequest>,
) -> Result<Json<AccountActionResponse>, Error> {
    let (status, verb) = match request.action.as_str() {
        "approve" => (AccountStatus::Active, "approved"),
        "suspend" => (AccountStatus::Suspended, "suspended"),
        _ => return Err(Error::InvalidAction(request.action)),
    };

    let connection = lock_connection(&state.db_connection)?;
    let account = set_account_status(account_id, status, &connection)?;

    tracing::info!("Bank account {account_id} is now {status}");

    Ok(Json(AccountActionResponse {
        message: format!("Account {verb} successfully"),
        account,
    }))
}

/// Delete a bank account, its transactions and their audit logs.
///
/// The account's balance is taken off its owner's total balance.
pub async fn delete_account_endpoint(
    State(state): State<CustomerState>,
    IdPath(account_id): IdPath,
) -> Result<Json<MessageBody>, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    delete_bank_account(account_id, &mut connection)?;

    Ok(Json(MessageBody::new("Account deleted successfully")))
}
