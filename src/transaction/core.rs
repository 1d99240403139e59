//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// Alias for the integer type used for transaction IDs in the database.
pub type TransactionId = i64;

/// The title given to transactions that arrive without one.
pub const DEFAULT_TITLE: &str = "Untitled";
/// The description given to transactions that arrive without one.
pub const DEFAULT_DESCRIPTION: &str = "No description";
/// The category given to transactions that arrive without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

// ============================================================================
// MODELS
// ============================================================================

/// A product sale, i.e. a product listed at a price on a given date that may
/// or may not have been sold.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The name of the product.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The price the product was listed at.
    pub price: f64,
    /// When the sale happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
    /// Whether the product was sold.
    pub is_sold: bool,
    /// The product category, e.g. "electronics".
    pub category: String,
    /// A URL to an image of the product, empty if there is none.
    pub image: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(title: &str, price: f64, date_of_sale: OffsetDateTime) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            price,
            date_of_sale,
            is_sold: false,
            category: DEFAULT_CATEGORY.to_owned(),
            image: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Fields that are not set explicitly take the same defaults that are applied
/// to items from the transaction feed.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// use crate::transaction::Transaction;
///
/// let builder = Transaction::build("Mens Casual Slim Fit", 15.99, datetime!(2022-03-14 10:00 UTC))
///     .category("men's clothing")
///     .is_sold(true);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The name of the product.
    pub title: String,

    /// A text description of the product.
    ///
    /// Defaults to [DEFAULT_DESCRIPTION].
    pub description: String,

    /// The price the product was listed at.
    pub price: f64,

    /// When the sale happened.
    ///
    /// Stored with millisecond precision, anything finer is truncated.
    pub date_of_sale: OffsetDateTime,

    /// Whether the product was sold. Defaults to `false`.
    pub is_sold: bool,

    /// The product category. Defaults to [DEFAULT_CATEGORY].
    pub category: String,

    /// A URL to an image of the product. Defaults to an empty string.
    pub image: String,
}

impl TransactionBuilder {
    /// Set the description of the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set whether the product was sold.
    pub fn is_sold(mut self, is_sold: bool) -> Self {
        self.is_sold = is_sold;
        self
    }

    /// Set the category of the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the image URL of the transaction.
    pub fn image(mut self, image: &str) -> Self {
        self.image = image.to_owned();
        self
    }
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// Convert a date-time to the milliseconds since the Unix epoch that are stored in the database.
pub(crate) fn to_timestamp_millis(date_time: OffsetDateTime) -> i64 {
    date_time.unix_timestamp_nanos().div_euclid(1_000_000) as i64
}

fn from_timestamp_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (title, description, price, date_of_sale, is_sold, category, image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, title, description, price, date_of_sale, is_sold, category, image",
        )?
        .query_row(
            (
                builder.title,
                builder.description,
                builder.price,
                to_timestamp_millis(builder.date_of_sale),
                builder.is_sold,
                builder.category,
                builder.image,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Insert many transactions with a single prepared statement.
///
/// Callers that need the insert to be atomic should pass a
/// [rusqlite::Transaction], which dereferences to a [Connection].
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn insert_transactions(
    builders: &[TransactionBuilder],
    connection: &Connection,
) -> Result<usize, Error> {
    let mut statement = connection.prepare(
        "INSERT INTO \"transaction\" (title, description, price, date_of_sale, is_sold, category, image)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    let mut inserted = 0;
    for builder in builders {
        inserted += statement.execute((
            &builder.title,
            &builder.description,
            builder.price,
            to_timestamp_millis(builder.date_of_sale),
            builder.is_sold,
            &builder.category,
            &builder.image,
        ))?;
    }

    Ok(inserted)
}

/// Delete every transaction in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM \"transaction\"", ())
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                date_of_sale INTEGER NOT NULL,
                is_sold INTEGER NOT NULL CHECK (is_sold IN (0, 1)),
                category TEXT NOT NULL,
                image TEXT NOT NULL
                )",
        (),
    )?;

    // Every report filters on the sale date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_of_sale ON \"transaction\"(date_of_sale);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order
/// `id, title, description, price, date_of_sale, is_sold, category, image`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let description = row.get(2)?;
    let price = row.get(3)?;
    let date_of_sale = from_timestamp_millis(row.get(4)?).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(error))
    })?;
    let is_sold = row.get(5)?;
    let category = row.get(6)?;
    let image = row.get(7)?;

    Ok(Transaction {
        id,
        title,
        description,
        price,
        date_of_sale,
        is_sold,
        category,
        image,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use time::macros::datetime;

    use crate::{
        test_utils::get_test_connection,
        transaction::{
            DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, Transaction, count_transactions,
            create_transaction, delete_all_transactions, insert_transactions,
        },
    };

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let date_of_sale = datetime!(2022-03-14 10:30:15.250 UTC);

        let result = create_transaction(
            Transaction::build("Backpack", 109.95, date_of_sale)
                .category("men's clothing")
                .is_sold(true),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.title, "Backpack");
                assert_eq!(transaction.price, 109.95);
                assert_eq!(transaction.date_of_sale, date_of_sale);
                assert!(transaction.is_sold);
                assert_eq!(transaction.category, "men's clothing");
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn builder_applies_defaults() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build("Ring", 9.99, datetime!(2022-03-01 0:00 UTC)),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.description, DEFAULT_DESCRIPTION);
        assert_eq!(transaction.category, DEFAULT_CATEGORY);
        assert_eq!(transaction.image, "");
        assert!(!transaction.is_sold);
    }

    #[test]
    fn date_of_sale_is_normalised_to_utc() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build("Jacket", 56.99, datetime!(2021-11-27 20:29:54 +05:30)),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.date_of_sale, datetime!(2021-11-27 14:59:54 UTC));
    }

    #[test]
    fn insert_many_and_delete_all() {
        let conn = get_test_connection();
        let builders: Vec<_> = (1..=5)
            .map(|i| Transaction::build("", i as f64, datetime!(2022-03-01 0:00 UTC)))
            .collect();

        let inserted = insert_transactions(&builders, &conn).expect("Could not insert");
        assert_eq!(inserted, 5);
        assert_eq!(count_transactions(&conn).unwrap(), 5);

        let deleted = delete_all_transactions(&conn).expect("Could not delete");
        assert_eq!(deleted, 5);
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let date_of_sale = datetime!(2022-10-05 12:00 UTC);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(Transaction::build("", i as f64, date_of_sale), &conn)
                .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
