//! The category breakdown for a month of sales.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{MonthRange, to_timestamp_millis},
};

/// The number of transactions in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category name.
    pub category: String,
    /// The number of transactions in the category.
    pub count: u32,
}

/// Count the transactions in `month_range` by category.
///
/// Only categories with at least one transaction are returned, sorted by name.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_category_counts(
    month_range: MonthRange,
    connection: &Connection,
) -> Result<Vec<CategoryCount>, Error> {
    connection
        .prepare(
            "SELECT category, COUNT(id)
            FROM \"transaction\"
            WHERE date_of_sale BETWEEN ?1 AND ?2
            GROUP BY category
            ORDER BY category ASC",
        )?
        .query_map(
            (
                to_timestamp_millis(month_range.start),
                to_timestamp_millis(month_range.end),
            ),
            |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    count: row.get(1)?,
                })
            },
        )?
        .collect::<Result<Vec<CategoryCount>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{get_test_connection, insert_march_2022_sales, march_2022};

    use super::{CategoryCount, get_category_counts};

    #[test]
    fn counts_transactions_by_category() {
        let conn = get_test_connection();
        insert_march_2022_sales(&conn);

        let got = get_category_counts(march_2022(), &conn).unwrap();

        // The April electronics sale is outside of the month.
        assert_eq!(
            got,
            vec![
                CategoryCount {
                    category: "electronics".to_owned(),
                    count: 1
                },
                CategoryCount {
                    category: "jewelery".to_owned(),
                    count: 1
                },
                CategoryCount {
                    category: "men's clothing".to_owned(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn empty_month_has_no_categories() {
        let conn = get_test_connection();

        let got = get_category_counts(march_2022(), &conn).unwrap();

        assert!(got.is_empty());
    }
}
