//! Summary statistics for a month of sales.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{MonthRange, to_timestamp_millis},
};

/// Totals over the transactions in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of all transactions, sold or not.
    pub total_sale_amount: f64,
    /// The number of transactions where the product was sold.
    pub total_sold_items: u32,
    /// The number of transactions where the product was not sold.
    pub total_not_sold_items: u32,
}

/// Calculate the [Statistics] for the transactions in `month_range`.
///
/// All three totals come from one aggregate query so they always describe
/// the same set of transactions.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_statistics(month_range: MonthRange, connection: &Connection) -> Result<Statistics, Error> {
    connection
        .prepare(
            "SELECT
                TOTAL(price),
                COALESCE(SUM(is_sold), 0),
                COUNT(id) - COALESCE(SUM(is_sold), 0)
            FROM \"transaction\"
            WHERE date_of_sale BETWEEN ?1 AND ?2",
        )?
        .query_row(
            (
                to_timestamp_millis(month_range.start),
                to_timestamp_millis(month_range.end),
            ),
            |row| {
                Ok(Statistics {
                    total_sale_amount: row.get(0)?,
                    total_sold_items: row.get(1)?,
                    total_not_sold_items: row.get(2)?,
                })
            },
        )
        .map_err(|error| error.into())
}
