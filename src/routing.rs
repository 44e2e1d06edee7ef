//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::{
    AppState,
    auth::{auth_guard, get_me, get_session_status, post_log_in, post_log_out},
    customer::{
        delete_account_endpoint, delete_user_endpoint, get_customer_account_endpoint,
        get_customer_bank_accounts_endpoint, get_customers_endpoint, get_users_endpoint,
        toggle_account_owner_approval_endpoint, toggle_user_approval_endpoint,
        update_account_status_endpoint,
    },
    endpoints,
    internal_server_error::attach_error_details,
    not_found::get_404_not_found,
    transaction::{
        add_funds_endpoint, get_audit_log_endpoint, get_reconciliation_endpoint,
        get_transactions_endpoint, review_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::SESSION, get(get_session_status));

    let protected_routes = Router::new()
        .route(endpoints::ME, get(get_me))
        .route(endpoints::CUSTOMERS, get(get_customers_endpoint))
        .route(
            endpoints::CUSTOMER_ACCOUNT,
            get(get_customer_account_endpoint)
                .patch(update_account_status_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::CUSTOMER_BANK_ACCOUNTS,
            get(get_customer_bank_accounts_endpoint),
        )
        .route(endpoints::ADD_FUNDS, patch(add_funds_endpoint))
        .route(
            endpoints::CUSTOMER_TOGGLE_APPROVAL,
            patch(toggle_account_owner_approval_endpoint),
        )
        .route(endpoints::USERS, get(get_users_endpoint))
        .route(endpoints::USER, delete(delete_user_endpoint))
        .route(
            endpoints::USER_TOGGLE_APPROVAL,
            patch(toggle_user_approval_endpoint),
        )
        .route(
            endpoints::USER_RECONCILIATION,
            get(get_reconciliation_endpoint),
        )
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::TRANSACTION, patch(review_transaction_endpoint))
        .route(
            endpoints::TRANSACTION_AUDIT_LOG,
            get(get_audit_log_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            attach_error_details,
        ))
        .with_state(state)
}
