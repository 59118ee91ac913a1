//! Query server for movie location lookups.
//!
//! Provides an HTTP API for radius searches over the latitude-sorted location
//! array and for looking up movies and locations by key or position.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sfmovies::{DirectorySource, LocationService, Snapshot};

mod handlers;
use handlers::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Movie location query server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Directory holding movie_data.json, loc_data.json and lat_data.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Re-read the tables from disk on every request instead of loading them once
    #[arg(long)]
    reload_per_query: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("SF Movies Query Server");

    let service = if args.reload_per_query {
        info!(
            "Serving tables from {} (re-read per query)",
            args.data_dir.display()
        );
        LocationService::new(DirectorySource::new(&args.data_dir))
    } else {
        info!("Loading dataset from {}", args.data_dir.display());
        let snapshot = Snapshot::load(&args.data_dir).with_context(|| {
            format!("Failed to load dataset from {}", args.data_dir.display())
        })?;
        LocationService::new(snapshot)
    };

    match service.stats() {
        Some(stats) => info!(
            "Dataset has {} movies and {} location records",
            stats.movies, stats.locations
        ),
        None => warn!("Dataset is not readable yet; queries will return empty results"),
    }

    let state = Arc::new(AppState { service });

    // Build router
    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
