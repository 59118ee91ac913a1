//! Lookup service answering the four catalog queries.

use std::sync::Arc;

use tracing::{debug, warn};

use super::TableSource;
use crate::error::StoreError;
use crate::models::{LocationEntry, MovieInfo, MovieLocation};

/// Counts reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetStats {
    pub movies: usize,
    pub locations: usize,
}

/// Catalog lookups over any [`TableSource`].
///
/// Every query answers. A table that cannot be read is logged and treated
/// as empty, so callers only ever see "found" or "nothing".
#[derive(Clone)]
pub struct LocationService {
    source: Arc<dyn TableSource>,
}

impl LocationService {
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Metadata for a movie key such as `"Vertigo (1958)"`
    pub fn get_movie_info(&self, movie_key: &str) -> Option<MovieInfo> {
        let movies = self.read("get_movie_info", |s| s.movies())?;
        movies.get(movie_key).cloned()
    }

    /// All locations recorded for a movie key
    pub fn get_locations_by_key(&self, movie_key: &str) -> Vec<MovieLocation> {
        self.read("get_locations_by_key", |s| s.locations())
            .and_then(|locations| locations.get(movie_key).cloned())
            .unwrap_or_default()
    }

    /// Denormalized records for positions returned by [`Self::query_radius`].
    ///
    /// Positions outside the array are dropped from the output.
    pub fn get_locations_by_positions(&self, positions: &[i64]) -> Vec<LocationEntry> {
        if positions.is_empty() {
            return Vec::new();
        }

        self.read("get_locations_by_positions", |s| s.latitude_index())
            .map(|index| index.entries_at(positions))
            .unwrap_or_default()
    }

    /// Positions of every record within `radius_ft` feet of (`lat`, `lng`),
    /// in ascending order.
    pub fn query_radius(&self, lat: f64, lng: f64, radius_ft: f64) -> Vec<usize> {
        if !(lat.is_finite() && lng.is_finite() && radius_ft.is_finite()) || radius_ft < 0.0 {
            debug!("query_radius({}, {}, {}): invalid input", lat, lng, radius_ft);
            return Vec::new();
        }

        self.read("query_radius", |s| s.latitude_index())
            .map(|index| index.query_radius(lat, lng, radius_ft))
            .unwrap_or_default()
    }

    /// Table sizes, or `None` if the tables cannot be read
    pub fn stats(&self) -> Option<DatasetStats> {
        let movies = self.read("stats", |s| s.movies())?;
        let index = self.read("stats", |s| s.latitude_index())?;
        Some(DatasetStats {
            movies: movies.len(),
            locations: index.len(),
        })
    }

    fn read<T>(
        &self,
        operation: &str,
        table: impl FnOnce(&dyn TableSource) -> Result<T, StoreError>,
    ) -> Option<T> {
        match table(self.source.as_ref()) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("{}: returning empty result: {}", operation, e);
                None
            }
        }
    }
}
