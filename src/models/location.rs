//! Location records and their geometry.
//!
//! On disk and on the wire a geometry is a flat list of numbers: two values
//! (`lat, lng`) for a single spot, four (`lat1, lng1, lat2, lng2`) for a street
//! range. The arity is the only tag.

use geo::{Coord, Line, Point};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Where a movie location is: a single spot or a stretch of street.
///
/// Coordinates are stored as `geo` types with `x = lng`, `y = lat`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub enum Geometry {
    Point(Point<f64>),
    Segment(Line<f64>),
}

impl Geometry {
    pub fn point(lat: f64, lng: f64) -> Self {
        Geometry::Point(Point::new(lng, lat))
    }

    pub fn segment(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> Self {
        Geometry::Segment(Line::new(
            Coord { x: lng1, y: lat1 },
            Coord { x: lng2, y: lat2 },
        ))
    }

    /// The first lat/lng pair; the one the latitude index is keyed on.
    pub fn primary(&self) -> Point<f64> {
        match self {
            Geometry::Point(p) => *p,
            Geometry::Segment(line) => line.start_point(),
        }
    }

    /// The second endpoint of a street range.
    pub fn secondary(&self) -> Option<Point<f64>> {
        match self {
            Geometry::Point(_) => None,
            Geometry::Segment(line) => Some(line.end_point()),
        }
    }

    /// Latitude of the primary point
    pub fn latitude(&self) -> f64 {
        self.primary().y()
    }

    pub fn is_segment(&self) -> bool {
        matches!(self, Geometry::Segment(_))
    }
}

impl From<Geometry> for Vec<f64> {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Point(p) => vec![p.y(), p.x()],
            Geometry::Segment(line) => vec![line.start.y, line.start.x, line.end.y, line.end.x],
        }
    }
}

impl TryFrom<Vec<f64>> for Geometry {
    type Error = GeometryError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        match values[..] {
            [lat, lng] => Ok(Geometry::point(lat, lng)),
            [lat1, lng1, lat2, lng2] => Ok(Geometry::segment(lat1, lng1, lat2, lng2)),
            _ => Err(GeometryError::Arity(values.len())),
        }
    }
}

/// One entry of a movie's location list: `[description, note, coordinates]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(String, String, Geometry)",
    into = "(String, String, Geometry)"
)]
pub struct MovieLocation {
    pub description: String,
    /// "Fun fact" text attached to the location
    pub note: String,
    pub geometry: Geometry,
}

impl From<(String, String, Geometry)> for MovieLocation {
    fn from((description, note, geometry): (String, String, Geometry)) -> Self {
        Self {
            description,
            note,
            geometry,
        }
    }
}

impl From<MovieLocation> for (String, String, Geometry) {
    fn from(loc: MovieLocation) -> Self {
        (loc.description, loc.note, loc.geometry)
    }
}

/// One entry of the flat, latitude-sorted location array:
/// `[latitude, coordinates, movie_key, description, note]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(f64, Geometry, String, String, String)",
    into = "(f64, Geometry, String, String, String)"
)]
pub struct IndexedLocation {
    /// Sort key; the latitude of the primary point
    pub latitude: f64,
    pub geometry: Geometry,
    pub movie_key: String,
    pub description: String,
    pub note: String,
}

impl IndexedLocation {
    pub fn new(movie_key: impl Into<String>, location: MovieLocation) -> Self {
        Self {
            latitude: location.geometry.latitude(),
            geometry: location.geometry,
            movie_key: movie_key.into(),
            description: location.description,
            note: location.note,
        }
    }

    /// Denormalized view handed out by position lookups
    pub fn to_entry(&self) -> LocationEntry {
        LocationEntry {
            movie_key: self.movie_key.clone(),
            description: self.description.clone(),
            note: self.note.clone(),
            geometry: self.geometry,
        }
    }
}

impl From<(f64, Geometry, String, String, String)> for IndexedLocation {
    fn from(
        (latitude, geometry, movie_key, description, note): (f64, Geometry, String, String, String),
    ) -> Self {
        Self {
            latitude,
            geometry,
            movie_key,
            description,
            note,
        }
    }
}

impl From<IndexedLocation> for (f64, Geometry, String, String, String) {
    fn from(loc: IndexedLocation) -> Self {
        (
            loc.latitude,
            loc.geometry,
            loc.movie_key,
            loc.description,
            loc.note,
        )
    }
}

/// Location returned by a position lookup:
/// `[movie_key, description, note, coordinates]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(String, String, String, Geometry)",
    into = "(String, String, String, Geometry)"
)]
pub struct LocationEntry {
    pub movie_key: String,
    pub description: String,
    pub note: String,
    pub geometry: Geometry,
}

impl From<(String, String, String, Geometry)> for LocationEntry {
    fn from(
        (movie_key, description, note, geometry): (String, String, String, Geometry),
    ) -> Self {
        Self {
            movie_key,
            description,
            note,
            geometry,
        }
    }
}

impl From<LocationEntry> for (String, String, String, Geometry) {
    fn from(entry: LocationEntry) -> Self {
        (entry.movie_key, entry.description, entry.note, entry.geometry)
    }
}
