use axum::{Json, extract::State};

use crate::{
    Error,
    db::lock_connection,
    extract::IdPath,
    transaction::{
        ledger::{Reconciliation, reconcile_user_balance},
        review_endpoint::LedgerState,
    },
};

/// Compare a customer's stored total balance with the sum of their account balances.
pub async fn get_reconciliation_endpoint(
    State(state): State<LedgerState>,
    IdPath(user_id): IdPath,
) -> Result<Json<Reconciliation>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    reconcile_user_balance(user_id, &connection).map(Json)
}
