//! Customers and their bank accounts.
//!
//! Bank account routes live under `/customers/{id}` for historical reasons, so
//! `{id}` is a bank account ID there unless the handler says otherwise.

mod accounts_endpoint;
mod bank_accounts_endpoint;
mod core;
mod toggle_approval_endpoint;
mod users_endpoint;

pub use accounts_endpoint::{
    delete_account_endpoint, get_customer_account_endpoint, get_customers_endpoint,
    update_account_status_endpoint,
};
pub use bank_accounts_endpoint::get_customer_bank_accounts_endpoint;
pub use core::{
    AccountStatus, AccountType, BankAccount, BankAccountId, NewBankAccount, NewUser, User, UserId,
    create_bank_account, create_bank_account_table, create_user, create_user_table,
    get_bank_account, get_bank_accounts_for_user, get_user,
};
pub use toggle_approval_endpoint::{
    toggle_account_owner_approval_endpoint, toggle_user_approval_endpoint,
};
pub use users_endpoint::{delete_user_endpoint, get_users_endpoint};
