use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A geographic position in degrees
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(*self, *other)
    }
}

// geo::Point is x = longitude, y = latitude
impl From<GeoPoint> for geo::Point {
    fn from(point: GeoPoint) -> geo::Point {
        geo::Point::new(point.longitude, point.latitude)
    }
}

impl From<geo::Point> for GeoPoint {
    fn from(point: geo::Point) -> GeoPoint {
        GeoPoint::new(point.y(), point.x())
    }
}

/// Great-circle distance in meters between two points (haversine).
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let to_rad = |deg: f64| deg * PI / 180.0;

    let phi1 = to_rad(a.latitude);
    let phi2 = to_rad(b.latitude);
    let delta_phi = to_rad(b.latitude - a.latitude);
    let delta_lambda = to_rad(b.longitude - a.longitude);

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] near antipodes
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Distance, Haversine};

    fn assert_rel_eq(a: f64, b: f64, tol: f64) {
        let scale = a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= tol * scale, "{} != {}", a, b);
    }

    #[test]
    fn same_point_is_zero() {
        let points = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(45.9645464, -108.276076),
            GeoPoint::new(-89.9, 179.9),
        ];
        for p in points {
            assert_eq!(distance(p, p), 0.0);
        }
    }

    #[test]
    fn symmetric() {
        let pairs = [
            (GeoPoint::new(10.0, 10.0), GeoPoint::new(10.05, 10.02)),
            (GeoPoint::new(53.7335433, -114.3807141), GeoPoint::new(42.7983343, -89.9704023)),
            (GeoPoint::new(-33.86, 151.2), GeoPoint::new(51.5, -0.12)),
        ];
        for (a, b) in pairs {
            assert_rel_eq(distance(a, b), distance(b, a), 1e-6);
        }
    }

    #[test]
    fn one_degree_of_latitude_at_equator() {
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn antipodal_points_do_not_blow_up() {
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(d.is_finite());
        assert_rel_eq(d, PI * EARTH_RADIUS_METERS, 1e-9);

        let d = distance(GeoPoint::new(90.0, 0.0), GeoPoint::new(-90.0, 0.0));
        assert!(d.is_finite() && d > 0.0);
    }

    #[test]
    fn agrees_with_geo_haversine() {
        let a = GeoPoint::new(45.9645464, -108.276076);
        let b = GeoPoint::new(53.7340404, -114.3788339);
        let ours = a.distance_to(&b);
        let theirs = Haversine::distance(geo::Point::from(a), geo::Point::from(b));
        // geo uses a slightly larger mean radius
        assert_rel_eq(ours, theirs, 1e-5);
    }

    #[test]
    fn geo_point_conversion() {
        let p = GeoPoint::new(1.2, 3.4);
        let gp: geo::Point = p.into();
        assert_eq!((gp.x(), gp.y()), (3.4, 1.2));
        assert_eq!(GeoPoint::from(gp), p);
    }
}
