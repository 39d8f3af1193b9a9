use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::distance::GeoPoint;
use crate::error::GeofenceError;
use crate::zone::{DefaultZone, DEFAULT_RADIUS, DEFAULT_ZOOM};

const DEFAULT_KEYS: [&str; 4] = [
    "default.radius",
    "default.latitude",
    "default.longitude",
    "default.zoom",
];
const COORDS_KEYS: [&str; 2] = ["coords.latitude", "coords.longitude"];

fn is_known_key(key: &str) -> bool {
    DEFAULT_KEYS.contains(&key) || COORDS_KEYS.contains(&key)
}

/// Typed view of the query parameters
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchParams {
    pub default: Option<DefaultZone>,
    pub coords: Option<GeoPoint>,
}

impl SearchParams {
    pub fn decode<K, V, I>(pairs: I) -> SearchParams
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        // Last occurrence of a key wins
        let fields: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        let has_any = |keys: &[&str]| keys.iter().any(|k| fields.contains_key(*k));
        let number = |key: &str, fallback: f64| {
            fields
                .get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(fallback)
        };
        let bounded = |key: &str, limit: f64| {
            let v = number(key, 0.0);
            if v.abs() <= limit {
                v
            } else {
                0.0
            }
        };
        let latitude = |key: &str| bounded(key, 90.0);
        let longitude = |key: &str| bounded(key, 180.0);

        let default = if has_any(&DEFAULT_KEYS) {
            let radius = number("default.radius", DEFAULT_RADIUS);
            let zoom = number("default.zoom", DEFAULT_ZOOM as f64);
            Some(DefaultZone {
                center: GeoPoint::new(
                    latitude("default.latitude"),
                    longitude("default.longitude"),
                ),
                radius: sanitize_radius(radius),
                zoom: sanitize_zoom(zoom),
            })
        } else {
            None
        };

        let coords = if has_any(&COORDS_KEYS) {
            Some(GeoPoint::new(
                latitude("coords.latitude"),
                longitude("coords.longitude"),
            ))
        } else {
            None
        };

        SearchParams { default, coords }
    }

    pub fn parse_query(query: &str) -> SearchParams {
        SearchParams::decode(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Query pairs for every field of the objects that are set.
    /// Values are written verbatim, including non-finite ones.
    pub fn encode(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(zone) = &self.default {
            pairs.push(("default.radius", zone.radius.to_string()));
            pairs.push(("default.latitude", zone.center.latitude.to_string()));
            pairs.push(("default.longitude", zone.center.longitude.to_string()));
            pairs.push(("default.zoom", zone.zoom.to_string()));
        }
        if let Some(coords) = &self.coords {
            pairs.push(("coords.latitude", coords.latitude.to_string()));
            pairs.push(("coords.longitude", coords.longitude.to_string()));
        }
        pairs
    }
}

/// Negative or non-finite radius falls back to zero
pub fn sanitize_radius(radius: f64) -> f64 {
    if radius.is_finite() && radius >= 0.0 {
        radius
    } else {
        DEFAULT_RADIUS
    }
}

/// Zoom must be a whole number in i32 range
pub fn sanitize_zoom(zoom: f64) -> i32 {
    let in_range = zoom >= i32::MIN as f64 && zoom <= i32::MAX as f64;
    if zoom.is_finite() && zoom.fract() == 0.0 && in_range {
        zoom as i32
    } else {
        DEFAULT_ZOOM
    }
}

/// Externally observable state shared by the machine and the host
pub trait CoordinateStore {
    /// Latest decoded snapshot
    fn snapshot(&self) -> SearchParams;

    /// Replaces the whole record; last write wins
    fn replace(&mut self, params: SearchParams);
}

/// Store backed by the query string of a navigational URL
#[derive(Debug, Clone)]
pub struct UrlStore {
    url: Url,
}

impl UrlStore {
    pub fn new(url: Url) -> UrlStore {
        UrlStore { url }
    }

    pub fn parse(input: &str) -> Result<UrlStore, GeofenceError> {
        Ok(UrlStore::new(Url::parse(input)?))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl CoordinateStore for UrlStore {
    fn snapshot(&self) -> SearchParams {
        SearchParams::decode(self.url.query_pairs())
    }

    fn replace(&mut self, params: SearchParams) {
        // Keep parameters that belong to other parts of the page
        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| !is_known_key(k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let ours = params.encode();

        if others.is_empty() && ours.is_empty() {
            self.url.set_query(None);
            return;
        }
        self.url
            .query_pairs_mut()
            .clear()
            .extend_pairs(others)
            .extend_pairs(ours);
    }
}

impl fmt::Display for UrlStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
