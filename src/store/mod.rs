//! Record store: the movie table, per-movie location lists and the
//! latitude-sorted location array, plus the lookup service over them.

mod service;
mod source;
mod tables;

pub use service::{DatasetStats, LocationService};
pub use source::{DirectorySource, Snapshot, TableSource};
pub use tables::{
    LocationTable, MovieTable, LATITUDE_TABLE_FILE, LOCATION_TABLE_FILE, MOVIE_TABLE_FILE,
};
