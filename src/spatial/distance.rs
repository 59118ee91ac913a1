//! Great-circle distance and latitude windows.

/// Radius of the Earth in feet.
pub const EARTH_RADIUS_FT: f64 = 20_925_524.9;

/// Great-circle distance between two lat/lng points given in decimal degrees,
/// using the haversine formula.
///
/// The result is in the same unit as `earth_radius`.
pub fn great_circle_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64, earth_radius: f64) -> f64 {
    let (lat1, lng1) = (lat1.to_radians(), lng1.to_radians());
    let (lat2, lng2) = (lat2.to_radians(), lng2.to_radians());

    let a = ((lat1 - lat2) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lng1 - lng2) / 2.0).sin().powi(2);

    2.0 * earth_radius * a.sqrt().asin()
}

/// Great-circle distance in feet.
pub fn distance_ft(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    great_circle_distance(lat1, lng1, lat2, lng2, EARTH_RADIUS_FT)
}

/// Minimum and maximum latitudes reachable within `radius_ft` of `lat`.
///
/// Treats a degree of latitude as a constant length, which holds away from
/// the poles. Any point within `radius_ft` has a latitude inside the returned
/// range, so the range is safe for pruning but not a final filter.
pub fn latitude_bounds(lat: f64, radius_ft: f64) -> (f64, f64) {
    let delta = (radius_ft / EARTH_RADIUS_FT).to_degrees();
    (lat - delta, lat + delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Distance, Haversine, Point};

    const FT_PER_M: f64 = 3.280_839_895;

    fn assert_within_percent(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < expected / 100.0,
            "{} is not within 1% of {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_reference_distances() {
        assert_within_percent(distance_ft(37.7763, -122.4346, 37.8005, -122.4159), 10344.5);
        assert_within_percent(distance_ft(32.9697, -96.80322, 29.46786, -98.53506), 1387005.0);
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_ft(37.8039069, -122.4640618, 37.8039069, -122.4640618), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = distance_ft(37.6213129, -122.3789554, 37.734211, -122.465729);
        let b = distance_ft(37.734211, -122.465729, 37.6213129, -122.3789554);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_unit_follows_radius() {
        let km = great_circle_distance(52.52, 13.405, 48.8566, 2.3522, 6371.0);
        assert!((km - 878.0).abs() < 5.0, "Berlin-Paris: {}", km);
    }

    #[test]
    fn test_agrees_with_geo_haversine() {
        let (a, b) = (Point::new(-122.4346, 37.7763), Point::new(-122.4159, 37.8005));
        let expected_ft = Haversine.distance(a, b) * FT_PER_M;
        assert_within_percent(distance_ft(a.y(), a.x(), b.y(), b.x()), expected_ft);
    }

    #[test]
    fn test_latitude_bounds_round_trip() {
        for (lat, lng, radius) in [(37.7763, -122.0, 1000.0), (35.0, 120.0, 3180.0)] {
            let (min_lat, max_lat) = latitude_bounds(lat, radius);
            assert!(min_lat < lat);
            assert!(max_lat > lat);

            assert_within_percent(distance_ft(lat, lng, min_lat, lng), radius);
            assert_within_percent(distance_ft(lat, lng, max_lat, lng), radius);
        }
    }

    #[test]
    fn test_latitude_bounds_zero_radius() {
        assert_eq!(latitude_bounds(37.78, 0.0), (37.78, 37.78));
    }
}
