//! Replaces the stored transactions with the contents of the feed.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    seed::feed::FeedClient,
    transaction::{TransactionBuilder, delete_all_transactions, insert_transactions},
};

/// The state needed to seed the database.
#[derive(Debug, Clone)]
pub struct SeedState {
    /// The database connection to write the transactions to.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The client for the transaction feed.
    pub feed_client: FeedClient,
}

impl FromRef<AppState> for SeedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            feed_client: state.feed_client.clone(),
        }
    }
}

/// The response body for a successful seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedResponse {
    /// A human readable confirmation.
    pub message: String,
    /// The number of transactions now in the database.
    pub count: usize,
}

/// A route handler that replaces every transaction with the contents of the feed.
pub async fn get_seed(State(state): State<SeedState>) -> Result<Json<SeedResponse>, Error> {
    let count = seed_database(&state.feed_client, &state.db_connection).await?;

    Ok(Json(SeedResponse {
        message: "Database seeded successfully".to_owned(),
        count,
    }))
}

/// Fetch the feed and replace the stored transactions with its items.
///
/// The feed is fetched before the database is locked. If the fetch fails the
/// stored transactions are left untouched.
///
/// # Errors
/// Returns [Error::FeedError] if the feed could not be fetched, or
/// [Error::SqlError]/[Error::DatabaseLockError] if the database could not be updated.
pub async fn seed_database(
    feed_client: &FeedClient,
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<usize, Error> {
    let items = feed_client
        .fetch()
        .await
        .inspect_err(|error| tracing::error!("could not fetch feed: {error}"))?;

    let ingested_at = OffsetDateTime::now_utc();
    let builders: Vec<_> = items
        .into_iter()
        .map(|item| item.normalize(ingested_at))
        .collect();

    let mut connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let count = replace_all_transactions(&builders, &mut connection)?;
    tracing::info!("Seeded the database with {count} transactions");

    Ok(count)
}

/// Delete every transaction and insert `builders` in one SQL transaction.
///
/// # Errors
/// Returns [Error::SqlError] if any statement fails, in which case nothing is changed.
pub fn replace_all_transactions(
    builders: &[TransactionBuilder],
    connection: &mut Connection,
) -> Result<usize, Error> {
    let sql_transaction = connection.transaction()?;

    let deleted = delete_all_transactions(&sql_transaction)?;
    let inserted = insert_transactions(builders, &sql_transaction)?;

    sql_transaction.commit()?;
    tracing::debug!("Replaced {deleted} transactions with {inserted}");

    Ok(inserted)
}
