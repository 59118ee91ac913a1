//! sfmovies - proximity lookups over San Francisco film locations
//!
//! This library provides the data models, the latitude-sorted radius index and
//! the record store shared by the `query` server and the `ingest` pipeline.

pub mod error;
pub mod models;
pub mod spatial;
pub mod store;

pub use error::{GeometryError, StoreError};
pub use models::{movie_key, Geometry, IndexedLocation, LocationEntry, MovieInfo, MovieLocation};
pub use spatial::{great_circle_distance, latitude_bounds, LatitudeIndex};
pub use store::{DirectorySource, LocationService, Snapshot, TableSource};
