use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    Error,
    customer::{
        accounts_endpoint::CustomerState,
        core::{BankAccount, get_bank_accounts_for_user, get_user},
    },
    db::lock_connection,
    extract::IdPath,
};

#[derive(Debug, Serialize)]
pub struct BankAccountsResponse {
    accounts: Vec<BankAccount>,
}

/// List a customer's bank accounts. The path ID is the customer's user ID.
///
/// Responds with 404 if the customer does not exist or has no accounts.
pub async fn get_customer_bank_accounts_endpoint(
    State(state): State<CustomerState>,
    IdPath(user_id): IdPath,
) -> Result<Json<BankAccountsResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_user(user_id, &connection)?;
    let accounts = get_bank_accounts_for_user(user_id, &connection)?;

    if accounts.is_empty() {
        return Err(Error::BankAccountNotFound);
    }

    Ok(Json(BankAccountsResponse { accounts }))
}
