//! Transactions and the ledger that keeps balances in step with them.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The audit log of admin actions on transactions
//! - The ledger writer, the only code that changes balances
//! - The route handlers for listing, reviewing and auditing transactions,
//!   adding funds, and reconciling customer balances

mod add_funds_endpoint;
mod audit;
mod audit_log_endpoint;
mod core;
mod ledger;
mod list_endpoint;
mod reconciliation_endpoint;
mod review_endpoint;

pub use add_funds_endpoint::add_funds_endpoint;
pub use audit::create_audit_log_table;
pub use audit_log_endpoint::get_audit_log_endpoint;
pub use core::{
    Transaction, TransactionId, TransactionStatus, TransactionType, create_transaction,
    create_transaction_table,
};
pub use ledger::{FundsAdded, add_funds, delete_bank_account};
pub use list_endpoint::get_transactions_endpoint;
pub use reconciliation_endpoint::get_reconciliation_endpoint;
pub use review_endpoint::review_transaction_endpoint;

#[cfg(test)]
pub(crate) use ledger::reconcile_user_balance;
