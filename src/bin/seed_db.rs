use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use rusqlite::Connection;

use salesboard_rs::{DEFAULT_FEED_URL, FeedClient, FeedConfig, initialize_db, seed_database};

/// A utility for creating a database seeded from the transaction feed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The URL of the JSON transaction feed.
    #[arg(long, env = "SALESBOARD_FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// How many seconds to wait for the transaction feed.
    #[arg(long, default_value_t = 30)]
    feed_timeout_secs: u64,
}

/// Create a database and fill it with the transactions from the feed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'salesboard.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'salesboard.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let feed_client = FeedClient::new(&FeedConfig {
        url: args.feed_url,
        timeout: Duration::from_secs(args.feed_timeout_secs),
    })?;

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    initialize_db(&conn)?;

    println!("Fetching transactions from {}...", feed_client.url());
    let conn = Arc::new(Mutex::new(conn));
    let count = seed_database(&feed_client, &conn).await?;

    println!("Seeded {count} transactions. Success!");

    Ok(())
}
