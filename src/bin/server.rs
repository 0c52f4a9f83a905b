use std::{fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use pcs_tracker::{AppState, ErrorDetail, HttpExpenseApi, build_router, graceful_shutdown};

/// The web front end for the PCS expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database that stores local preferences.
    #[arg(long)]
    db_path: String,

    /// Base URL of the PCS backend, e.g. `http://localhost:5000`.
    #[arg(long)]
    api_url: String,

    /// The port to serve the pages from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Show the underlying error in widgets that fail to load.
    #[arg(long)]
    detailed_fetch_errors: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let error_detail = if args.detailed_fetch_errors {
        ErrorDetail::Detailed
    } else {
        ErrorDetail::Generic
    };

    let conn = Connection::open(&args.db_path).expect("Could not open the preference database.");
    let api = HttpExpenseApi::new(&args.api_url);
    let app_state = AppState::new(conn, Arc::new(api), &args.api_url, error_detail)
        .expect("Could not initialize the preference database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {addr}, using the backend at {}", args.api_url);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
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
        // Backend failures are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
