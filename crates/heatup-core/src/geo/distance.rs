//! Great-circle distance on a spherical earth.

use std::f64::consts::PI;

use super::Position;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degrees to radians conversion factor.
const DEG_TO_RAD: f64 = PI / 180.0;

/// Calculate the great-circle distance between two positions in kilometers.
///
/// Uses the haversine formula. The inputs are not validated; callers are
/// expected to pass positions built with [`Position::new`]. NaN coordinates
/// yield NaN.
///
/// # Example
///
/// ```
/// use heatup_core::geo::{distance_km, Position};
///
/// let origin = Position::new(45.0, 25.0).unwrap();
/// let target = Position::new(45.0, 25.1).unwrap();
/// let d = distance_km(origin, target);
/// assert!((d - 7.86).abs() < 0.05);
/// ```
pub fn distance_km(a: Position, b: Position) -> f64 {
    let lat1_rad = a.latitude * DEG_TO_RAD;
    let lat2_rad = b.latitude * DEG_TO_RAD;
    let delta_lat = (b.latitude - a.latitude) * DEG_TO_RAD;
    let delta_lon = (b.longitude - a.longitude) * DEG_TO_RAD;

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push h a hair outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(lat: f64, lon: f64) -> Position {
        Position::new_unchecked(lat, lon)
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for p in [pos(0.0, 0.0), pos(45.1555, 23.3489), pos(-89.9, 179.9), pos(90.0, -180.0)] {
            assert!(distance_km(p, p).abs() < 1e-9, "non-zero self distance for {}", p);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (pos(45.0, 25.0), pos(45.0, 25.1)),
            (pos(-33.86, 151.21), pos(51.5, -0.12)),
            (pos(0.0, 179.5), pos(0.0, -179.5)),
        ];
        for (a, b) in pairs {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_one_degree_latitude() {
        // 1 degree of latitude is ~111.19 km on a 6371 km sphere
        let d = distance_km(pos(0.0, 0.0), pos(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01);
    }

    #[test]
    fn test_scenario_distances() {
        let origin = pos(45.0, 25.0);
        let far = distance_km(origin, pos(45.0, 25.1));
        assert!((far - 7.86).abs() < 0.02, "got {}", far);

        let near = distance_km(origin, pos(45.001, 25.0));
        assert!((near - 0.111).abs() < 0.001, "got {}", near);
    }

    #[test]
    fn test_antipodal_is_finite() {
        let d = distance_km(pos(0.0, 0.0), pos(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_km(pos(f64::NAN, 0.0), pos(0.0, 0.0)).is_nan());
    }
}
