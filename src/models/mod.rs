//! Core data models for the movie location catalog.

pub mod location;
pub mod movie;

pub use location::{Geometry, IndexedLocation, LocationEntry, MovieLocation};
pub use movie::{movie_key, MovieInfo};
