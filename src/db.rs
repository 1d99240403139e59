//! Sets up the application's SQLite database.

use rusqlite::{Connection, functions::FunctionFlags};

use crate::{Error, transaction::create_transaction_table};

/// The name of the SQL function that lowercases text with full Unicode case folding.
///
/// SQLite's built-in `lower` only folds ASCII letters.
pub const UNICODE_LOWER: &str = "unicode_lower";

/// Create the tables for the domain models if they do not exist yet and
/// register the SQL functions the queries rely on.
///
/// Safe to call on an existing database. Functions are registered per
/// connection, so every connection must be initialized.
///
/// # Errors
/// Returns an [Error::SqlError] if a table, index or function could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    register_unicode_lower(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}

fn register_unicode_lower(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let text: Option<String> = context.get(0)?;

            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}
