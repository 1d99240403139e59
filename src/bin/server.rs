use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::exit,
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use salesboard_rs::{
    AppState, DEFAULT_FEED_URL, DEFAULT_PRICE_BOUNDARIES, DEFAULT_REFERENCE_YEAR, FeedConfig,
    PaginationConfig, PriceRanges, ReportConfig, build_router, graceful_shutdown,
    logging_middleware,
};

/// The REST API server for the sales transaction dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "SALESBOARD_DB_PATH", default_value = "salesboard.db")]
    db_path: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, env = "SALESBOARD_PORT", default_value_t = 5000)]
    port: u16,

    /// The URL of the JSON transaction feed used to seed the database.
    #[arg(long, env = "SALESBOARD_FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// How many seconds to wait for the transaction feed.
    #[arg(long, env = "SALESBOARD_FEED_TIMEOUT", default_value_t = 30)]
    feed_timeout_secs: u64,

    /// The year used when a request does not specify one.
    #[arg(long, env = "SALESBOARD_REFERENCE_YEAR", default_value_t = DEFAULT_REFERENCE_YEAR)]
    reference_year: i32,

    /// The canonical name of the timezone months are reported in, e.g. "Pacific/Auckland".
    #[arg(long, env = "SALESBOARD_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The lower bounds of the price ranges, comma separated and strictly increasing.
    #[arg(
        long,
        env = "SALESBOARD_PRICE_BOUNDARIES",
        value_delimiter = ',',
        default_values_t = DEFAULT_PRICE_BOUNDARIES
    )]
    price_boundaries: Vec<f64>,

    /// The number of transactions per page when a request does not specify one.
    #[arg(long, env = "SALESBOARD_PAGE_SIZE", default_value_t = 10)]
    page_size: u64,

    /// The largest page size a client may request.
    #[arg(long, env = "SALESBOARD_MAX_PAGE_SIZE", default_value_t = 100)]
    max_page_size: u64,

    /// The frontend origin that browsers may call the API from.
    #[arg(long, env = "SALESBOARD_ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    allowed_origin: String,

    /// File path for the debug log.
    #[arg(long, env = "SALESBOARD_LOG_PATH", default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let price_ranges = match PriceRanges::new(args.price_boundaries.clone()) {
        Ok(price_ranges) => price_ranges,
        Err(error) => {
            tracing::error!("{error}");
            exit(1);
        }
    };

    let allowed_origin = match HeaderValue::from_str(&args.allowed_origin) {
        Ok(origin) => origin,
        Err(error) => {
            tracing::error!("Invalid allowed origin {:?}: {error}", args.allowed_origin);
            exit(1);
        }
    };

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database {}: {error}", args.db_path.display());
            exit(1);
        }
    };

    let state = AppState::new(
        conn,
        ReportConfig {
            reference_year: args.reference_year,
            local_timezone: args.timezone.clone(),
            price_ranges,
        },
        PaginationConfig {
            default_page: 1,
            default_page_size: args.page_size,
            max_page_size: args.max_page_size,
        },
        FeedConfig {
            url: args.feed_url.clone(),
            timeout: Duration::from_secs(args.feed_timeout_secs),
        },
    );
    let state = match state {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not create the app state: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state, Some(allowed_origin))
        .layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
