//! Route handlers that switch auto-approval of a customer's transactions on or off.

use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    customer::{
        accounts_endpoint::CustomerState,
        core::{UserId, get_bank_account, get_user, set_auto_approval},
    },
    db::lock_connection,
    extract::{IdPath, parse_optional_json},
};

/// The optional body of a toggle request. Without it the setting is flipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleApprovalRequest {
    auto_approved_transaction: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleApprovalResponse {
    message: &'static str,
    user_id: UserId,
    auto_approved_transaction: bool,
}

/// Toggle auto-approval for the owner of a bank account. The path ID is the
/// bank account ID.
pub async fn toggle_account_owner_approval_endpoint(
    State(state): State<CustomerState>,
    IdPath(account_id): IdPath,
    body: Bytes,
) -> Result<Json<ToggleApprovalResponse>, Error> {
    let request = parse_optional_json::<ToggleApprovalRequest>(&body)?;
    let connection = lock_connection(&state.db_connection)?;
    let account = get_bank_account(account_id, &connection)?;

    toggle_approval(account.user_id, request, &connection)
}

/// Toggle auto-approval for a customer. The path ID is the customer's user ID.
pub async fn toggle_user_approval_endpoint(
    State(state): State<CustomerState>,
    IdPath(user_id): IdPath,
    body: Bytes,
) -> Result<Json<ToggleApprovalResponse>, Error> {
    let request = parse_optional_json::<ToggleApprovalRequest>(&body)?;
    let connection = lock_connection(&state.db_connection)?;

    toggle_approval(user_id, request, &connection)
}

fn toggle_approval(
    user_id: UserId,
    request: Option<ToggleApprovalRequest>,
    connection: &rusqlite::Connection,
) -> Result<Json<ToggleApprovalResponse>, Error> {
    let auto_approved_transaction = match request {
        Some(request) => request.auto_approved_transaction,
        None => !get_user(user_id, connection)?.auto_approved_transaction,
    };

    let user = set_auto_approval(user_id, auto_approved_transaction, connection)?;

    tracing::info!(
        "Auto-approval for customer {user_id} is now {}",
        user.auto_approved_transaction
    );

    Ok(Json(ToggleApprovalResponse {
        message: "Auto-approval updated",
        user_id,
        auto_approved_transaction: user.auto_approved_transaction,
    }))
}
