//! Bankdesk is the back-office API for bank administrators.
//!
//! This library provides a JSON API for admin authentication, customer and
//! bank account administration, and the transaction ledger: adding funds,
//! approving and rejecting pending transactions, and keeping account and
//! customer balances consistent with the transaction history.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod api_response;
mod app_state;
mod auth;
mod config;
mod customer;
mod database_id;
mod db;
mod email;
mod endpoints;
mod extract;
mod internal_server_error;
mod logging;
mod money;
mod not_found;
mod pagination;
mod password;
mod routing;
mod sql_enum;
mod timestamp;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use api_response::{ErrorBody, MessageBody};
pub use app_state::AppState;
pub use auth::{Admin, AdminRole, NewAdmin, create_admin, get_admin_by_email};
pub use config::RuntimeMode;
pub use customer::{
    AccountStatus, AccountType, BankAccount, NewBankAccount, NewUser, User, create_bank_account,
    create_user,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use transaction::{
    FundsAdded, Transaction, TransactionStatus, TransactionType, add_funds, create_transaction,
};

use crate::{
    internal_server_error::internal_server_error_response, not_found::not_found_response,
    transaction::TransactionId,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password did not match an active admin.
    ///
    /// Unknown emails, inactive admins and wrong passwords all produce this
    /// error so that clients cannot tell which accounts exist.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a session cookie.
    #[error("no session found")]
    SessionMissing,

    /// The session cookie did not resolve to a live session of an active admin.
    #[error("invalid or expired session")]
    InvalidSession,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The request body was missing, was not JSON, or did not match the
    /// expected shape.
    #[error("validation failed: {0}")]
    InvalidBody(String),

    /// The query string could not be parsed.
    #[error("invalid query parameters: {0}")]
    InvalidQuery(String),

    /// A monetary amount was not positive, had more than two decimal places,
    /// or was too large to store.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The `action` field of a request named an action the endpoint does not support.
    #[error("invalid action \"{0}\"")]
    InvalidAction(String),

    /// The request was well-formed but cannot be carried out as given.
    #[error("{0}")]
    InvalidRequest(String),

    /// A transaction cannot move money because it is not linked to both a
    /// customer and a bank account.
    #[error("transaction {0} is not linked to a customer and a bank account")]
    MissingLedgerLink(TransactionId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The customer ID does not refer to a customer.
    #[error("customer not found")]
    CustomerNotFound,

    /// The bank account ID does not refer to a bank account, or the account
    /// belongs to a different customer.
    #[error("bank account not found or does not belong to the customer")]
    BankAccountNotFound,

    /// The transaction ID does not refer to a transaction.
    #[error("transaction not found")]
    TransactionNotFound,

    /// The transaction has already been approved or rejected.
    #[error("transaction is {0}, only PENDING transactions can be changed")]
    TransactionNotPending(TransactionStatus),

    /// The email address is already used by another admin or customer.
    #[error("the email \"{0}\" is already registered")]
    DuplicateEmail(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::SessionMissing | Error::InvalidSession => {
                StatusCode::UNAUTHORIZED
            }
            Error::InvalidBody(_)
            | Error::InvalidQuery(_)
            | Error::InvalidAmount(_)
            | Error::InvalidAction(_)
            | Error::InvalidRequest(_)
            | Error::MissingLedgerLink(_)
            | Error::TooWeak(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::CustomerNotFound
            | Error::BankAccountNotFound
            | Error::TransactionNotFound => StatusCode::NOT_FOUND,
            Error::TransactionNotPending(_) | Error::DuplicateEmail(_) => StatusCode::CONFLICT,
            Error::HashingError(_) | Error::SqlError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message shown to API clients.
    fn client_body(self) -> ErrorBody {
        let (error, details) = match self {
            Error::InvalidCredentials => ("Invalid email or password".to_owned(), None),
            Error::SessionMissing => ("No session found".to_owned(), None),
            Error::InvalidSession => ("Invalid or expired session".to_owned(), None),
            Error::InvalidBody(details) => ("Validation failed".to_owned(), Some(details)),
            Error::InvalidQuery(details) => ("Invalid query parameters".to_owned(), Some(details)),
            Error::InvalidAmount(details) => ("Invalid amount".to_owned(), Some(details)),
            Error::InvalidAction(action) => (
                "Invalid action".to_owned(),
                Some(format!("\"{action}\" is not a supported action")),
            ),
            Error::NotFound => ("Not found".to_owned(), None),
            Error::CustomerNotFound => ("Customer not found".to_owned(), None),
            Error::BankAccountNotFound => (
                "Bank account not found or does not belong to the customer".to_owned(),
                None,
            ),
            Error::TransactionNotFound => ("Transaction not found".to_owned(), None),
            error => (capitalise_first_char(&error.to_string()), None),
        };

        ErrorBody { error, details }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            return internal_server_error_response(&self);
        }

        if self == Error::NotFound {
            return not_found_response();
        }

        (status, Json(self.client_body())).into_response()
    }
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
