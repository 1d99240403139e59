//! The API endpoint URIs.
//!
//! Every endpoint is nested under [TRANSACTIONS].

/// The root of the transaction API.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route that replaces the stored transactions with the feed.
pub const SEED: &str = "/seed";
/// The route for a page of the transactions in a month.
pub const LIST: &str = "/list";
/// The route for the summary statistics of a month.
pub const STATISTICS: &str = "/statistics";
/// The route for the price-range histogram of a month.
pub const BARCHART: &str = "/barchart";
/// The route for the category breakdown of a month.
pub const PIECHART: &str = "/piechart";
/// The route for the statistics, histogram and categories of a month in one response.
pub const COMBINED: &str = "/combined";

/// Join `route` onto the transaction API root, e.g. "/api/transactions/list".
#[cfg(test)]
pub fn transactions_endpoint(route: &str) -> String {
    format!("{TRANSACTIONS}{route}")
}
