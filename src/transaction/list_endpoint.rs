use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    db::lock_connection,
    extract::QueryParams,
    pagination::{Page, PageInfo, PageQuery, PaginationConfig},
    transaction::core::{
        TransactionListItem, TransactionStatus, count_transactions, get_transaction_page,
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionListState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The page size defaults and limits.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config,
        }
    }
}

/// The query string of the transaction list.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    transactions: Vec<TransactionListItem>,
    pagination: PageInfo,
}

/// List transactions newest first, one page at a time, optionally only those
/// with the given `status`.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionListState>,
    QueryParams(query): QueryParams<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, Error> {
    let page = Page::from_query(
        &PageQuery {
            page: query.page,
            limit: query.limit,
        },
        &state.pagination_config,
    )?;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(status) => Some(
            status
                .parse::<TransactionStatus>()
                .map_err(Error::InvalidQuery)?,
        ),
    };

    let connection = lock_connection(&state.db_connection)?;
    let total = count_transactions(status, &connection)?;
    let transactions = get_transaction_page(page, status, &connection)?;

    Ok(Json(TransactionListResponse {
        transactions,
        pagination: PageInfo::new(page, total),
    }))
}
