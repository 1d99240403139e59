//! Product sale transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, counting and replacing transactions
//! - Month range resolution and request validation shared by every report
//! - The route handler for listing a month of transactions

mod core;
mod listing;
mod month;
mod request;

pub use core::{
    DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_TITLE, Transaction, TransactionBuilder,
    TransactionId, count_transactions, create_transaction_table, delete_all_transactions,
    insert_transactions, map_transaction_row,
};
pub(crate) use core::to_timestamp_millis;
pub use listing::get_transaction_list;
pub use month::{MonthRange, resolve_month_range};
pub use request::{MonthQuery, ReportRequest};

#[cfg(test)]
pub use core::create_transaction;
