use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    Error,
    db::lock_connection,
    extract::IdPath,
    transaction::{
        audit::{AuditLogEntry, get_audit_log},
        core::{TransactionId, get_transaction},
        review_endpoint::LedgerState,
    },
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    transaction_id: TransactionId,
    audit_log: Vec<AuditLogEntry>,
}

/// List the admin actions on a transaction, oldest first.
pub async fn get_audit_log_endpoint(
    State(state): State<LedgerState>,
    IdPath(transaction_id): IdPath,
) -> Result<Json<AuditLogResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, &connection)?;
    let audit_log = get_audit_log(transaction_id, &connection)?;

    Ok(Json(AuditLogResponse {
        transaction_id,
        audit_log,
    }))
}
