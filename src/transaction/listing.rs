//! The route handler and database query for listing a month of transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    pagination::{Page, PaginationConfig},
    transaction::{
        core::{Transaction, map_transaction_row, to_timestamp_millis},
        month::MonthRange,
        request::{ListingQuery, ListingRequest, Search},
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListingState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls the default and maximum page sizes.
    pub pagination_config: PaginationConfig,
    /// The year to use when a request does not specify one.
    pub reference_year: i32,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ListingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
            reference_year: state.report_config.reference_year,
            local_timezone: state.report_config.local_timezone.clone(),
        }
    }
}

/// A route handler that returns one page of the transactions in a month.
///
/// A page with no matching transactions is returned as an empty array.
pub async fn get_transaction_list(
    State(state): State<ListingState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let request = ListingRequest::from_query(
        &query,
        state.reference_year,
        &state.pagination_config,
    )?;
    let month_range = request.period.month_range(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(
        month_range,
        request.search.as_ref(),
        request.page,
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    tracing::debug!(
        "Listing {} transactions for {} {}",
        transactions.len(),
        request.period.month,
        request.period.year
    );

    Ok(Json(transactions))
}

/// Get a page of the transactions in `month_range`, in the order they were stored.
///
/// When `search` is given, only transactions whose title or description contains
/// the search text (ignoring case) are returned, along with transactions
/// whose price equals the search text if it is a number.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    month_range: MonthRange,
    search: Option<&Search>,
    page: Page,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let search_text = search.map(|search| search.text.to_lowercase());
    let search_price = search.and_then(|search| search.price);
    let limit = i64::try_from(page.size).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    connection
        .prepare(
            "SELECT id, title, description, price, date_of_sale, is_sold, category, image \
            FROM \"transaction\" \
            WHERE date_of_sale BETWEEN ?1 AND ?2 \
            AND (?3 IS NULL \
                OR instr(unicode_lower(title), ?3) > 0 \
                OR instr(unicode_lower(description), ?3) > 0 \
                OR price = ?4) \
            ORDER BY id ASC \
            LIMIT ?5 OFFSET ?6",
        )?
        .query_map(
            (
                to_timestamp_millis(month_range.start),
                to_timestamp_millis(month_range.end),
                search_text,
                search_price,
                limit,
                offset,
            ),
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}
