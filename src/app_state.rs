//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    dashboard::ReportConfig,
    db::initialize,
    pagination::PaginationConfig,
    seed::{FeedClient, FeedConfig},
    timezone::is_valid_timezone,
};

/// The state of the REST server.
///
/// Route handlers extract the parts they need with `FromRef`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The reference year, local timezone and price ranges used by the reports.
    pub report_config: ReportConfig,

    /// The config that controls the size of pages of transactions.
    pub pagination_config: PaginationConfig,

    /// The client used to fetch the transaction feed when seeding.
    pub feed_client: FeedClient,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `report_config.local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized, the timezone is
    /// not known or the feed client cannot be built.
    pub fn new(
        db_connection: Connection,
        report_config: ReportConfig,
        pagination_config: PaginationConfig,
        feed_config: FeedConfig,
    ) -> Result<Self, Error> {
        if !is_valid_timezone(&report_config.local_timezone) {
            return Err(Error::InvalidTimezone(report_config.local_timezone));
        }

        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            report_config,
            pagination_config,
            feed_client: FeedClient::new(&feed_config)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{AppState, Error, PaginationConfig, ReportConfig, seed::FeedConfig};

    #[test]
    fn new_initializes_database() {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            ReportConfig::default(),
            PaginationConfig::default(),
            FeedConfig::default(),
        )
        .unwrap();

        let conn = state.db_connection.lock().unwrap();
        assert_eq!(crate::transaction::count_transactions(&conn), Ok(0));
    }

    #[test]
    fn new_rejects_unknown_timezone() {
        let result = AppState::new(
            Connection::open_in_memory().unwrap(),
            ReportConfig {
                local_timezone: "Mars/Olympus_Mons".to_owned(),
                ..ReportConfig::default()
            },
            PaginationConfig::default(),
            FeedConfig::default(),
        );

        assert!(
            matches!(result, Err(Error::InvalidTimezone(ref zone)) if zone == "Mars/Olympus_Mons")
        );
    }
}
