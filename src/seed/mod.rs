//! Seeds the database from the external transaction feed.

mod feed;
mod ingest;

pub use feed::{DEFAULT_FEED_TIMEOUT, DEFAULT_FEED_URL, FeedClient, FeedConfig, FeedItem};
pub use ingest::{SeedResponse, get_seed, replace_all_transactions, seed_database};
