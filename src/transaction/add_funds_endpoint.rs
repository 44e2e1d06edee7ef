use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    customer::BankAccountId,
    db::lock_connection,
    extract::{IdPath, JsonBody},
    transaction::{
        ledger::{FundsAdded, add_funds},
        review_endpoint::LedgerState,
    },
};

/// The body of an add funds request.
///
/// `amount` may be sent as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFundsRequest {
    amount: Decimal,
    bank_account_id: Option<BankAccountId>,
}

#[derive(Debug, Serialize)]
pub struct AddFundsResponse {
    message: &'static str,
    #[serde(flatten)]
    funds_added: FundsAdded,
}

/// Deposit money into one of a customer's accounts. The path ID is the
/// customer's user ID.
pub async fn add_funds_endpoint(
    State(state): State<LedgerState>,
    IdPath(user_id): IdPath,
    JsonBody(request): JsonBody<AddFundsRequest>,
) -> Result<Json<AddFundsResponse>, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let funds_added = add_funds(
        user_id,
        request.bank_account_id,
        request.amount,
        OffsetDateTime::now_utc(),
        &mut connection,
    )?;

    Ok(Json(AddFundsResponse {
        message: "Funds added successfully",
        funds_added,
    }))
}
