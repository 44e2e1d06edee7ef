//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/customers/{id}', tests use `format_endpoint`.
//! Routes that share a prefix must use the same parameter name, so every
//! parameter is called `id`.

/// The route for logging in an admin.
pub const LOG_IN: &str = "/admin/login";
/// The route for logging out the current admin.
pub const LOG_OUT: &str = "/admin/logout";
/// The route to get the current admin.
pub const ME: &str = "/admin/me";
/// The route to check whether the session cookie is valid.
pub const SESSION: &str = "/admin/session";

/// The route to list every bank account with its owner.
pub const CUSTOMERS: &str = "/customers";
/// The route to get, change the status of, or delete one bank account.
pub const CUSTOMER_ACCOUNT: &str = "/customers/{id}";
/// The route to list the bank accounts of a customer, by user ID.
pub const CUSTOMER_BANK_ACCOUNTS: &str = "/customers/{id}/bank-accounts";
/// The route to add funds to one of a customer's accounts, by user ID.
pub const ADD_FUNDS: &str = "/customers/{id}/add-funds";
/// The route to toggle auto-approval for the owner of a bank account.
pub const CUSTOMER_TOGGLE_APPROVAL: &str = "/customers/{id}/toggle-approval";

/// The route to list customers.
pub const USERS: &str = "/users";
/// The route to delete a customer.
pub const USER: &str = "/users/{id}";
/// The route to toggle auto-approval for a customer.
pub const USER_TOGGLE_APPROVAL: &str = "/users/{id}/toggle-approval";
/// The route to compare a customer's stored total balance to their accounts.
pub const USER_RECONCILIATION: &str = "/users/{id}/reconciliation";

/// The route to list transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to approve, reject or edit a transaction.
pub const TRANSACTION: &str = "/transactions/{id}";
/// The route to list the audit log entries of a transaction.
pub const TRANSACTION_AUDIT_LOG: &str = "/transactions/{id}/audit-log";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with the next right brace.
/// For example, in the endpoint path '/customers/{id}', '{id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
