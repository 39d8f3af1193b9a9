use serde::{Deserialize, Serialize};

use crate::distance::GeoPoint;

pub const DEFAULT_RADIUS: f64 = 0.0;
pub const DEFAULT_ZOOM: i32 = 10;

/// The reference geofence the user edits
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DefaultZone {
    pub center: GeoPoint,
    /// Meters
    pub radius: f64,
    pub zoom: i32,
}

impl Default for DefaultZone {
    fn default() -> Self {
        DefaultZone {
            center: GeoPoint::default(),
            radius: DEFAULT_RADIUS,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl DefaultZone {
    pub fn new(center: GeoPoint, radius: f64) -> DefaultZone {
        DefaultZone {
            center,
            radius,
            ..DefaultZone::default()
        }
    }

    pub fn with_zoom(mut self, zoom: i32) -> DefaultZone {
        self.zoom = zoom;
        self
    }
}

/// Distance to the zone center and whether it lies inside the radius.
/// Always derived from a zone and a live coordinate, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ProximityResult {
    pub distance_meters: f64,
    pub within_radius: bool,
}

impl ProximityResult {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

pub fn evaluate(zone: Option<&DefaultZone>, live: Option<GeoPoint>) -> ProximityResult {
    match (zone, live) {
        (Some(zone), Some(live)) => {
            let distance_meters = zone.center.distance_to(&live);
            ProximityResult {
                distance_meters,
                within_radius: distance_meters <= zone.radius,
            }
        }
        _ => ProximityResult::default(),
    }
}
