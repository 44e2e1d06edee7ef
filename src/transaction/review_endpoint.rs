//! The endpoint admins use to approve, reject or edit a pending transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::Admin,
    db::lock_connection,
    extract::{IdPath, JsonBody},
    transaction::{
        core::Transaction,
        ledger::{TransactionEdit, approve_transaction, edit_transaction, reject_transaction},
    },
};

/// The state needed to change a transaction through the ledger.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The database connection for the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a review request.
///
/// The edit fields are only used by the `edit` action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    action: String,
    notes: Option<String>,
    #[serde(flatten)]
    edit: TransactionEdit,
}

#[derive(Debug, Serialize)]
struct ReviewResponse {
    message: &'static str,
    transaction: Transaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    refund: Option<Transaction>,
}

/// Approve, reject or edit a pending transaction.
///
/// `action` must be one of `approve`, `reject` or `edit`.
pub async fn review_transaction_endpoint(
    State(state): State<LedgerState>,
    Extension(admin): Extension<Admin>,
    IdPath(transaction_id): IdPath,
    JsonBody(request): JsonBody<ReviewRequest>,
) -> Result<Response, Error> {
    let now = OffsetDateTime::now_utc();
    let notes = request.notes.as_deref();
    let mut connection = lock_connection(&state.db_connection)?;

    let response = match request.action.as_str() {
        "approve" => ReviewResponse {
            message: "Transaction approved successfully",
            transaction: approve_transaction(transaction_id, admin.id, notes, now, &mut connection)?,
            refund: None,
        },
        "reject" => {
            let rejection =
                reject_transaction(transaction_id, admin.id, notes, now, &mut connection)?;

            ReviewResponse {
                message: "Transaction rejected and refunded",
                transaction: rejection.transaction,
                refund: Some(rejection.refund),
            }
        }
        "edit" => ReviewResponse {
            message: "Transaction updated successfully",
            transaction: edit_transaction(
                transaction_id,
                admin.id,
                request.edit,
                notes,
                now,
                &mut connection,
            )?,
            refund: None,
        },
        _ => return Err(Error::InvalidAction(request.action)),
    };

    Ok(Json(response).into_response())
}
