//! Salesboard is a small analytics service for product sale transactions.
//!
//! The library seeds a SQLite database from an external JSON feed and
//! serves month-scoped JSON reports over a REST API:
//! - a paginated, searchable listing of transactions,
//! - summary statistics (sale amount, sold and unsold item counts),
//! - a price-range histogram and a category breakdown,
//! - a combined view of the three reports.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod dashboard;
mod db;
mod endpoints;
mod logging;
mod pagination;
mod routing;
mod seed;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use dashboard::{DEFAULT_PRICE_BOUNDARIES, DEFAULT_REFERENCE_YEAR, PriceRanges, ReportConfig};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use seed::{DEFAULT_FEED_TIMEOUT, DEFAULT_FEED_URL, FeedClient, FeedConfig, seed_database};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent a request parameter that is missing or out of range,
    /// e.g., a month outside of 1-12.
    ///
    /// The string is a human readable description that is shown to the client.
    #[error("{0}")]
    InvalidInput(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The price range boundaries are empty, not finite or not strictly increasing.
    #[error("invalid price range boundaries: {0}")]
    InvalidPriceRanges(String),

    /// The transaction feed could not be fetched or decoded.
    #[error("could not fetch the transaction feed: {0}")]
    FeedError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    /// A short description of what went wrong.
    pub error: String,
    /// Extra detail about the failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Error {
    /// The HTTP status code that corresponds to this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        match self {
            Error::InvalidInput(message) => ErrorBody {
                error: message,
                details: None,
            },
            Error::FeedError(_) => ErrorBody {
                error: "Error seeding database".to_owned(),
                details: Some(self.to_string()),
            },
            Error::InvalidTimezone(_) | Error::InvalidPriceRanges(_) => ErrorBody {
                error: "Invalid server configuration".to_owned(),
                details: Some(self.to_string()),
            },
            Error::SqlError(_) | Error::DatabaseLockError => ErrorBody {
                error: "Error querying the database".to_owned(),
                details: Some(self.to_string()),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(self.into_body())).into_response()
    }
}
