//! Address geocoding with an on-disk cache.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use hashbrown::HashMap;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::config::GeocoderConfig;

/// Address → (lat, lng)
pub type Coordinates = HashMap<String, (f64, f64)>;

/// Previously resolved addresses, persisted between runs as `{address: [lat, lng]}`
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: BTreeMap<String, [f64; 2]>,
}

impl GeocodeCache {
    /// Load the cache; a missing file is an empty cache
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No geocode cache at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read geocode cache")?;
        let entries: BTreeMap<String, [f64; 2]> =
            serde_json::from_str(&content).context("Failed to parse geocode cache")?;
        info!("Loaded {} cached geocodes", entries.len());
        Ok(Self { entries })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, content).context("Failed to write geocode cache")?;
        Ok(())
    }

    pub fn get(&self, address: &str) -> Option<(f64, f64)> {
        self.entries.get(address).map(|[lat, lng]| (*lat, *lng))
    }

    pub fn insert(&mut self, address: String, (lat, lng): (f64, f64)) {
        self.entries.insert(address, [lat, lng]);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl SearchHit {
    /// `None` unless both values parse to finite, in-range degrees
    fn coordinates(&self) -> Option<(f64, f64)> {
        let lat: f64 = self.lat.trim().parse().ok()?;
        let lng: f64 = self.lon.trim().parse().ok()?;
        let valid = lat.is_finite() && lng.is_finite() && lat.abs() <= 90.0 && lng.abs() <= 180.0;
        valid.then_some((lat, lng))
    }
}

/// Client for a Nominatim-compatible `/search` endpoint
pub struct Geocoder {
    client: Client,
    search_url: Url,
    city_suffix: String,
    default_location: (f64, f64),
    concurrency: usize,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let mut search_url = Url::parse(&config.url).context("Invalid geocoder URL")?;
        search_url
            .path_segments_mut()
            .map_err(|_| anyhow!("Geocoder URL cannot take a path: {}", config.url))?
            .pop_if_empty()
            .push("search");

        let [lat, lng] = config.default_location;

        Ok(Self {
            client,
            search_url,
            city_suffix: config.city_suffix.clone(),
            default_location: (lat, lng),
            concurrency: config.concurrency.max(1),
        })
    }

    /// Look up one address; `Ok(None)` when the service has no match
    pub async fn locate(&self, address: &str) -> Result<Option<(f64, f64)>> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("{}{}", address, self.city_suffix))
            .append_pair("format", "json")
            .append_pair("limit", "1");

        let hits: Vec<SearchHit> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(hits.first().and_then(SearchHit::coordinates))
    }

    /// Resolve every address, consulting the cache first.
    ///
    /// Empty addresses and addresses that cannot be resolved map to the default
    /// location. New results are added to the cache; failures are not, so the
    /// next run retries them. With `offline` no requests are made.
    pub async fn resolve_all<'a>(
        &self,
        addresses: impl IntoIterator<Item = &'a str>,
        cache: &mut GeocodeCache,
        offline: bool,
    ) -> Coordinates {
        let mut coords = Coordinates::new();
        let mut missing = Vec::new();

        for address in addresses {
            if address.is_empty() {
                coords.insert(String::new(), self.default_location);
            } else if let Some(latlng) = cache.get(address) {
                coords.insert(address.to_string(), latlng);
            } else {
                missing.push(address.to_string());
            }
        }

        info!(
            "{} addresses cached, {} to geocode",
            coords.len(),
            missing.len()
        );

        if offline {
            if !missing.is_empty() {
                warn!(
                    "Offline: {} addresses fall back to the default location",
                    missing.len()
                );
            }
            for address in missing {
                coords.insert(address, self.default_location);
            }
            return coords;
        }

        let pb = ProgressBar::new(missing.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut results = stream::iter(missing)
            .map(|address| async move {
                let result = self.locate(&address).await;
                (address, result)
            })
            .buffer_unordered(self.concurrency);

        let mut failed = 0usize;
        while let Some((address, result)) = results.next().await {
            pb.inc(1);
            match result {
                Ok(Some(latlng)) => {
                    cache.insert(address.clone(), latlng);
                    coords.insert(address, latlng);
                }
                Ok(None) => {
                    warn!("No geocode result for '{}'", address);
                    failed += 1;
                    coords.insert(address, self.default_location);
                }
                Err(e) => {
                    warn!("Geocoding '{}' failed: {}", address, e);
                    failed += 1;
                    coords.insert(address, self.default_location);
                }
            }
        }
        pb.finish_and_clear();

        if failed > 0 {
            warn!("{} addresses fell back to the default location", failed);
        }

        coords
    }
}
