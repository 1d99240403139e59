//! Dashboard HTTP handlers.
//!
//! Each handler validates the month once, resolves it to a range of instants
//! and then runs its report while holding the database lock.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    dashboard::{
        categories::{CategoryCount, get_category_counts},
        config::ReportConfig,
        price_ranges::{PriceRangeCount, get_price_range_counts},
        statistics::{Statistics, get_statistics},
    },
    transaction::{MonthQuery, MonthRange, ReportRequest},
};

/// The state needed for the dashboard reports.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The reference year, timezone and price ranges for the reports.
    pub report_config: ReportConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            report_config: state.report_config.clone(),
        }
    }
}

impl DashboardState {
    fn month_range(&self, query: &MonthQuery) -> Result<MonthRange, Error> {
        let request = ReportRequest::from_query(query, self.report_config.reference_year)?;
        tracing::debug!("Reporting on {} {}", request.month, request.year);

        request.month_range(&self.report_config.local_timezone)
    }

    fn lock_connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

/// The statistics, price-range histogram and category breakdown for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedReport {
    /// The totals for the month.
    pub statistics: Statistics,
    /// The number of transactions per price range.
    pub bar_chart: Vec<PriceRangeCount>,
    /// The number of transactions per category.
    pub pie_chart: Vec<CategoryCount>,
}

/// A route handler for the summary statistics of a month.
pub async fn get_statistics_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Statistics>, Error> {
    let month_range = state.month_range(&query)?;
    let connection = state.lock_connection()?;

    get_statistics(month_range, &connection)
        .inspect_err(|error| tracing::error!("could not get statistics: {error}"))
        .map(Json)
}

/// A route handler for the price-range histogram of a month.
pub async fn get_price_range_chart(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<PriceRangeCount>>, Error> {
    let month_range = state.month_range(&query)?;
    let connection = state.lock_connection()?;

    get_price_range_counts(
        month_range,
        &state.report_config.price_ranges,
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not get price range counts: {error}"))
    .map(Json)
}

/// A route handler for the category breakdown of a month.
pub async fn get_category_chart(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    let month_range = state.month_range(&query)?;
    let connection = state.lock_connection()?;

    get_category_counts(month_range, &connection)
        .inspect_err(|error| tracing::error!("could not get category counts: {error}"))
        .map(Json)
}

/// A route handler for all three reports of a month in one response.
///
/// The reports are built under a single acquisition of the database lock, so
/// they describe the same set of transactions. If any report fails the whole
/// request fails.
pub async fn get_combined_report(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CombinedReport>, Error> {
    let month_range = state.month_range(&query)?;
    let connection = state.lock_connection()?;

    build_combined_report(month_range, &state.report_config, &connection)
        .inspect_err(|error| tracing::error!("could not build combined report: {error}"))
        .map(Json)
}

fn build_combined_report(
    month_range: MonthRange,
    report_config: &ReportConfig,
    connection: &Connection,
) -> Result<CombinedReport, Error> {
    Ok(CombinedReport {
        statistics: get_statistics(month_range, connection)?,
        bar_chart: get_price_range_counts(month_range, &report_config.price_ranges, connection)?,
        pie_chart: get_category_counts(month_range, connection)?,
    })
}
