use axum::{Json, extract::State};

use crate::{
    Error, MessageBody,
    customer::{
        accounts_endpoint::CustomerState,
        core::{UserWithAccounts, delete_user, get_all_users, get_bank_accounts_for_user},
    },
    db::lock_connection,
    extract::IdPath,
};

/// List every customer, newest first, with their bank accounts.
pub async fn get_users_endpoint(
    State(state): State<CustomerState>,
) -> Result<Json<Vec<UserWithAccounts>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let users = get_all_users(&connection)?
        .into_iter()
        .map(|user| {
            let bank_accounts = get_bank_accounts_for_user(user.id, &connection)?;

            Ok(UserWithAccounts {
                user,
                account_count: bank_accounts.len(),
                bank_accounts,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(Json(users))
}

/// Delete a customer along with their accounts, transactions and audit logs.
pub async fn delete_user_endpoint(
    State(state): State<CustomerState>,
    IdPath(user_id): IdPath,
) -> Result<Json<MessageBody>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_user(user_id, &connection)?;

    tracing::info!("Deleted customer {user_id}");

    Ok(Json(MessageBody::new("Customer deleted successfully")))
}
