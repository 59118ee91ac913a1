//! Latitude-sorted index for radius lookups.

use tracing::{debug, warn};

use super::distance::{distance_ft, latitude_bounds};
use crate::models::{IndexedLocation, LocationEntry};

/// Extra window, in feet, added to the query radius when pruning.
///
/// Records are keyed on the latitude of their first endpoint only, so a street
/// range whose second endpoint is inside the circle can sit slightly outside
/// the plain radius window. This is a fixed empirical margin, not a bound:
/// ranges longer than this in latitude can still be missed.
pub const SEGMENT_MARGIN_FT: f64 = 250.0;

/// Location records sorted ascending by latitude.
///
/// Positions into this array are the handles exchanged between
/// [`LatitudeIndex::query_radius`] and [`LatitudeIndex::entries_at`].
#[derive(Debug, Default)]
pub struct LatitudeIndex {
    locations: Vec<IndexedLocation>,
    /// Copy of each record's latitude for the binary search
    keys: Vec<f64>,
}

impl LatitudeIndex {
    /// Build the index, sorting by latitude if the input is not already sorted.
    ///
    /// The sort is stable, so records sharing a latitude keep their input order.
    pub fn new(mut locations: Vec<IndexedLocation>) -> Self {
        let sorted = locations
            .windows(2)
            .all(|w| w[0].latitude.total_cmp(&w[1].latitude).is_le());
        if !sorted {
            warn!(
                "Location records are not sorted by latitude, sorting {} records",
                locations.len()
            );
            locations.sort_by(|a, b| a.latitude.total_cmp(&b.latitude));
        }

        let keys = locations.iter().map(|l| l.latitude).collect();

        debug!("Latitude index built with {} entries", locations.len());

        Self { locations, keys }
    }

    /// Positions of all records within `radius_ft` of (`lat`, `lng`), ascending.
    ///
    /// A point matches when it is within the radius; a street range matches
    /// when either endpoint is.
    pub fn query_radius(&self, lat: f64, lng: f64, radius_ft: f64) -> Vec<usize> {
        let (start, stop) = self.window(lat, radius_ft + SEGMENT_MARGIN_FT);

        debug!(
            "query_radius({}, {}, {}): scanning window {}..{}",
            lat, lng, radius_ft, start, stop
        );

        let mut matches = Vec::new();
        for (i, loc) in self.locations[start..stop].iter().enumerate() {
            let primary = loc.geometry.primary();
            if distance_ft(lat, lng, primary.y(), primary.x()) <= radius_ft {
                matches.push(start + i);
                continue;
            }

            if let Some(end) = loc.geometry.secondary() {
                if distance_ft(lat, lng, end.y(), end.x()) <= radius_ft {
                    matches.push(start + i);
                }
            }
        }

        matches
    }

    /// Range of positions whose latitude lies in the window around `lat`.
    ///
    /// Both ends are leftmost insertion points, so a record exactly on the
    /// lower bound is included and one exactly on the upper bound is not.
    fn window(&self, lat: f64, radius_ft: f64) -> (usize, usize) {
        let (min_lat, max_lat) = latitude_bounds(lat, radius_ft);
        let start = self.keys.partition_point(|&k| k < min_lat);
        let stop = self.keys.partition_point(|&k| k < max_lat);
        (start, stop.max(start))
    }

    /// Denormalized records at the given positions.
    ///
    /// Positions outside `0..len` are skipped, so the result may be shorter
    /// than the input.
    pub fn entries_at(&self, positions: &[i64]) -> Vec<LocationEntry> {
        positions
            .iter()
            .filter_map(|&p| usize::try_from(p).ok())
            .filter_map(|p| self.locations.get(p))
            .map(IndexedLocation::to_entry)
            .collect()
    }

    pub fn as_slice(&self) -> &[IndexedLocation] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedLocation> {
        self.locations.iter()
    }
}
