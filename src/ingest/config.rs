use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL of a Nominatim-compatible service
    pub url: String,
    /// Appended to every address before lookup
    pub city_suffix: String,
    pub user_agent: String,
    /// Requests in flight at once
    pub concurrency: usize,
    /// `[lat, lng]` used for empty or unresolvable addresses
    pub default_location: [f64; 2],
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: "https://nominatim.openstreetmap.org".to_string(),
            city_suffix: ", San Francisco, CA".to_string(),
            user_agent: "sfmovies-ingest/0.1".to_string(),
            concurrency: 1,
            default_location: [37.76526, -122.44388],
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
