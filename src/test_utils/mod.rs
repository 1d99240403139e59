#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::{assert_content_type, assert_status_ok, parse_json_body};

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::{Month, macros::datetime};

use crate::{
    AppState, PaginationConfig, ReportConfig,
    db::initialize,
    seed::FeedConfig,
    transaction::{MonthRange, Transaction, create_transaction, resolve_month_range},
};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

/// The month range used by most tests, March 2022 in UTC.
pub(crate) fn march_2022() -> MonthRange {
    resolve_month_range(Month::March, 2022, "Etc/UTC").unwrap()
}

/// Three March 2022 sales priced 50, 150 and 950 where the first and last were sold,
/// plus one sale in April 2022 that should never be counted for March.
pub(crate) fn insert_march_2022_sales(conn: &Connection) {
    let sales = [
        ("T-shirt", 50.0, true, "men's clothing", datetime!(2022-03-02 9:00 UTC)),
        ("Hard drive", 150.0, false, "electronics", datetime!(2022-03-15 12:30 UTC)),
        ("Gold ring", 950.0, true, "jewelery", datetime!(2022-03-31 23:00 UTC)),
        ("Monitor", 400.0, true, "electronics", datetime!(2022-04-01 0:00 UTC)),
    ];

    for (title, price, is_sold, category, date_of_sale) in sales {
        create_transaction(
            Transaction::build(title, price, date_of_sale)
                .is_sold(is_sold)
                .category(category),
            conn,
        )
        .expect("Could not create test transaction");
    }
}

/// An [AppState] backed by `conn` with the default configuration.
pub(crate) fn get_test_state(conn: Connection) -> AppState {
    AppState::new(
        conn,
        ReportConfig::default(),
        PaginationConfig::default(),
        FeedConfig::default(),
    )
    .expect("Could not create app state")
}

pub(crate) fn shared_connection(conn: Connection) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(conn))
}
