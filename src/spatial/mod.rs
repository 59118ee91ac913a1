//! Radius queries over the latitude-sorted location array.
//!
//! A query prunes the array to a latitude window with two binary searches,
//! then checks the great-circle distance of every record in the window.

mod distance;
mod index;

pub use distance::{distance_ft, great_circle_distance, latitude_bounds, EARTH_RADIUS_FT};
pub use index::{LatitudeIndex, SEGMENT_MARGIN_FT};
