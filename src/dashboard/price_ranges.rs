//! The price-range histogram for a month of sales.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    dashboard::config::PriceRanges,
    transaction::{MonthRange, to_timestamp_millis},
};

/// The number of transactions whose price falls in one price range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeCount {
    /// The label of the price range, e.g. "100-200" or "900+".
    pub bucket: String,
    /// The inclusive lower bound of the range.
    pub min: f64,
    /// The exclusive upper bound of the range, `None` for the last range.
    pub max: Option<f64>,
    /// The number of transactions in the range.
    pub count: u32,
}

/// Count the transactions in `month_range` by price range.
///
/// Every range in `price_ranges` is included in the result in ascending
/// order, ranges without transactions have a count of zero.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_price_range_counts(
    month_range: MonthRange,
    price_ranges: &PriceRanges,
    connection: &Connection,
) -> Result<Vec<PriceRangeCount>, Error> {
    let prices = connection
        .prepare("SELECT price FROM \"transaction\" WHERE date_of_sale BETWEEN ?1 AND ?2")?
        .query_map(
            (
                to_timestamp_millis(month_range.start),
                to_timestamp_millis(month_range.end),
            ),
            |row| row.get(0),
        )?
        .collect::<Result<Vec<f64>, rusqlite::Error>>()?;

    Ok(count_by_price_range(&prices, price_ranges))
}

/// Count `prices` by the range they fall in.
pub(super) fn count_by_price_range(
    prices: &[f64],
    price_ranges: &PriceRanges,
) -> Vec<PriceRangeCount> {
    let mut counts = vec![0; price_ranges.len()];

    for &price in prices {
        counts[price_ranges.index_of(price)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| {
            let (min, max) = price_ranges.bounds(index);

            PriceRangeCount {
                bucket: price_ranges.label(index),
                min,
                max,
                count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        dashboard::config::PriceRanges,
        test_utils::{get_test_connection, insert_march_2022_sales, march_2022},
        transaction::{Transaction, create_transaction},
    };

    use super::{count_by_price_range, get_price_range_counts};

    #[test]
    fn counts_transactions_in_month_by_price_range() {
        let conn = get_test_connection();
        insert_march_2022_sales(&conn);

        let got = get_price_range_counts(march_2022(), &PriceRanges::default(), &conn).unwrap();

        let counts: Vec<_> = got.iter().map(|range| range.count).collect();
        assert_eq!(counts, [1, 1, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(got[9].bucket, "900+");
        assert_eq!(got[9].max, None);
    }

    #[test]
    fn empty_month_reports_every_range() {
        let conn = get_test_connection();

        let got = get_price_range_counts(march_2022(), &PriceRanges::default(), &conn).unwrap();

        assert_eq!(got.len(), 10);
        assert!(got.iter().all(|range| range.count == 0));
    }

    #[test]
    fn counts_sum_to_number_of_transactions() {
        let ranges = PriceRanges::default();
        let datasets: [Vec<f64>; 4] = [
            vec![0.0; 25],
            vec![900.0, 1200.5, 99_999.0],
            (0..2000).map(|i| i as f64 * 0.75).collect(),
            vec![-10.0, 0.0, 99.99, 100.0, 550.0, 899.99],
        ];

        for prices in datasets {
            let got = count_by_price_range(&prices, &ranges);

            let total: u32 = got.iter().map(|range| range.count).sum();
            assert_eq!(total, prices.len() as u32, "prices: {prices:?}");
            assert_eq!(got.len(), ranges.len());
        }
    }

    #[test]
    fn all_expensive_prices_fall_in_last_range() {
        let got = count_by_price_range(&[900.0, 901.0, 5000.0], &PriceRanges::default());

        assert_eq!(got[9].count, 3);
        assert!(got[..9].iter().all(|range| range.count == 0));
    }

    #[test]
    fn uses_configured_ranges() {
        let conn = get_test_connection();
        let date = datetime!(2022-03-20 8:00 UTC);
        for price in [5.0, 15.0, 25.0, 35.0] {
            create_transaction(Transaction::build("", price, date), &conn).unwrap();
        }
        let ranges = PriceRanges::new(vec![0.0, 20.0]).unwrap();

        let got = get_price_range_counts(march_2022(), &ranges, &conn).unwrap();

        let summary: Vec<_> = got
            .iter()
            .map(|range| (range.bucket.as_str(), range.count))
            .collect();
        assert_eq!(summary, [("0-20", 2), ("20+", 2)]);
    }
}
