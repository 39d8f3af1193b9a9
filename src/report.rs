use std::fmt;

use serde::{Deserialize, Serialize};

use crate::distance::GeoPoint;
use crate::machine::PermissionState;
use crate::store::SearchParams;
use crate::zone::ProximityResult;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub permission: PermissionState,
    pub proximity: ProximityResult,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = if self.proximity.within_radius {
            "You are within the radius!"
        } else {
            "You are outside the radius."
        };
        write!(
            f,
            "Distance : {:.2} (KM)\t{}",
            self.proximity.distance_km(),
            message
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillColor {
    Green,
    Red,
}

/// Everything the map collaborator draws: the zone circle, the default
/// marker at its center and the live marker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub radius: f64,
    pub zoom: i32,
    pub live: GeoPoint,
    pub fill: FillColor,
}

impl MapView {
    pub fn new(params: &SearchParams, proximity: ProximityResult) -> MapView {
        let zone = params.default.unwrap_or_default();
        MapView {
            center: zone.center,
            radius: zone.radius,
            zoom: zone.zoom,
            live: params.coords.unwrap_or_default(),
            fill: if proximity.within_radius {
                FillColor::Green
            } else {
                FillColor::Red
            },
        }
    }
}
