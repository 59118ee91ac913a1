//! Film locations ingest pipeline.
//!
//! Reads the DataSF film locations CSV, parses each location description into
//! addresses, geocodes them, and writes the three dataset tables consumed by
//! the query server.

mod catalog;
mod config;
mod geocode;
mod parse;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sfmovies::Snapshot;

use crate::catalog::{load_rows, sort_by_latitude, write_movie_keys, Catalog};
use crate::config::Config;
use crate::geocode::{GeocodeCache, Geocoder};
use crate::parse::{LocationParser, ParsedLocation};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build the movie location dataset from the film locations CSV")]
struct Args {
    /// Film locations CSV (optionally .gz)
    #[arg(short, long)]
    file: PathBuf,

    /// Output directory for movie_data.json, loc_data.json and lat_data.json
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// TOML config file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Geocode cache file, created if missing
    #[arg(long, default_value = "geocode_cache.json")]
    geocode_cache: PathBuf,

    /// Do not contact the geocoder; uncached addresses use the default location
    #[arg(long)]
    offline: bool,

    /// Also write the movie key list for the front end's autocomplete
    #[arg(long)]
    movie_keys: Option<PathBuf>,
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

    info!("SF Movies Ingest Pipeline");
    info!("File: {}", args.file.display());

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let catalog = Catalog::build(load_rows(&args.file)?);

    if let Some(path) = &args.movie_keys {
        write_movie_keys(catalog.movies.keys(), path)?;
    }

    // Parse descriptions
    let parser = LocationParser::new();
    let parsed: BTreeMap<String, ParsedLocation> = catalog
        .unique_descriptions()
        .map(|desc| (desc.to_string(), parser.parse(desc)))
        .collect();
    let ranges = parsed
        .values()
        .filter(|p| matches!(p, ParsedLocation::Range(..)))
        .count();
    info!(
        "Parsed {} descriptions ({} street ranges)",
        parsed.len(),
        ranges
    );

    // Geocode
    let mut cache = GeocodeCache::load(&args.geocode_cache)?;
    let geocoder = Geocoder::new(&config.geocoder)?;
    let addresses: Vec<&str> = {
        let mut all: Vec<&str> = parsed.values().flat_map(|p| p.addresses()).collect();
        all.sort_unstable();
        all.dedup();
        all
    };
    let coords = geocoder
        .resolve_all(addresses, &mut cache, args.offline)
        .await;
    cache
        .save(&args.geocode_cache)
        .context("Failed to save geocode cache")?;
    info!("Geocode cache holds {} addresses", cache.len());

    // Build tables
    let locations = catalog.locate(&parsed, &coords)?;
    let by_latitude = sort_by_latitude(&locations);
    info!("Sorted {} locations by latitude", by_latitude.len());

    let snapshot = Snapshot::new(catalog.movies, locations, by_latitude);
    snapshot
        .write_to_dir(&args.output)
        .with_context(|| format!("Failed to write dataset to {}", args.output.display()))?;

    info!("Dataset written to {}", args.output.display());
    Ok(())
}
