use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::distance::GeoPoint;
use crate::error::{GeofenceError, PositionError};
use crate::provider::{GeolocationProvider, PositionEvent, WatchHandle};
use crate::report::{MapView, StatusReport};
use crate::store::{sanitize_zoom, CoordinateStore, SearchParams};
use crate::zone::{evaluate, ProximityResult};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unrequested,
    Requesting,
    Granted,
    Denied,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PermissionState::Unrequested => "unrequested",
            PermissionState::Requesting => "requesting",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneField {
    Radius,
    Latitude,
    Longitude,
    Zoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateField {
    Latitude,
    Longitude,
}

/// Numeric value of a text field: NaN when empty or not a number
pub fn field_value(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

/// Reads the store snapshot and writes a full replacement on every change
pub struct GeofenceMachine<P: GeolocationProvider, S: CoordinateStore> {
    provider: P,
    store: S,
    permission: PermissionState,
    watch: Option<WatchHandle>,
    proximity: ProximityResult,
}

impl<P: GeolocationProvider, S: CoordinateStore> GeofenceMachine<P, S> {
    pub fn new(provider: P, store: S) -> GeofenceMachine<P, S> {
        let snapshot = store.snapshot();
        GeofenceMachine {
            provider,
            store,
            permission: PermissionState::Unrequested,
            watch: None,
            proximity: evaluate(snapshot.default.as_ref(), snapshot.coords),
        }
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn proximity(&self) -> ProximityResult {
        self.proximity
    }

    pub fn snapshot(&self) -> SearchParams {
        self.store.snapshot()
    }

    pub fn is_subscribed(&self) -> bool {
        self.watch.is_some()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            permission: self.permission,
            proximity: self.proximity,
        }
    }

    /// What the map draws, or `None` for the placeholder
    pub fn map_view(&self) -> Option<MapView> {
        if self.permission != PermissionState::Granted {
            return None;
        }
        Some(MapView::new(&self.store.snapshot(), self.proximity))
    }

    pub fn request_permission(&mut self) -> Result<(), GeofenceError> {
        match self.permission {
            PermissionState::Unrequested | PermissionState::Denied => {}
            state => return Err(GeofenceError::RequestInFlight(state)),
        }

        if !self.provider.is_available() {
            warn!("geolocation is not supported by this host");
            self.deny();
            return Err(GeofenceError::CapabilityUnavailable);
        }

        info!("geolocation starting");
        self.permission = PermissionState::Requesting;
        if let Err(err) = self.provider.request_once() {
            warn!(%err, "position request failed");
            self.deny();
            return Err(err);
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: PositionEvent) {
        match event {
            PositionEvent::Fix(point) => self.handle_position(point),
            PositionEvent::Error(err) => self.handle_error(err),
        }
    }

    pub fn handle_position(&mut self, point: GeoPoint) {
        match self.permission {
            PermissionState::Requesting | PermissionState::Granted => {}
            state => {
                debug!(%state, "ignoring stale position");
                return;
            }
        }

        debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            "location update"
        );
        let mut params = self.store.snapshot();
        params.coords = Some(point);
        self.write(params);
        self.permission = PermissionState::Granted;

        if self.watch.is_none() {
            match self.provider.subscribe() {
                Ok(handle) => {
                    debug!(watch_id = handle.id(), "watching position");
                    self.watch = Some(handle);
                }
                Err(err) => {
                    warn!(%err, "could not watch position");
                    self.deny();
                }
            }
        }
    }

    pub fn handle_error(&mut self, error: PositionError) {
        match self.permission {
            PermissionState::Requesting | PermissionState::Granted => {}
            state => {
                debug!(%state, %error, "ignoring stale location error");
                return;
            }
        }

        warn!(kind = %error.kind, "location error: {}", error.message);
        self.deny();
    }

    pub fn edit_zone(&mut self, field: ZoneField, value: f64) {
        let mut params = self.store.snapshot();
        let mut zone = params.default.unwrap_or_default();
        match field {
            ZoneField::Radius => zone.radius = value,
            ZoneField::Latitude => zone.center.latitude = value,
            ZoneField::Longitude => zone.center.longitude = value,
            ZoneField::Zoom => zone.zoom = sanitize_zoom(value),
        }
        params.default = Some(zone);
        self.write(params);
    }

    /// Drag-end of the default marker on the map
    pub fn move_default_marker(&mut self, point: GeoPoint) {
        let mut params = self.store.snapshot();
        let mut zone = params.default.unwrap_or_default();
        zone.center = point;
        params.default = Some(zone);
        self.write(params);
    }

    pub fn edit_live_coordinate(&mut self, field: CoordinateField, value: f64) {
        let mut params = self.store.snapshot();
        let mut coords = params.coords.unwrap_or_default();
        match field {
            CoordinateField::Latitude => coords.latitude = value,
            CoordinateField::Longitude => coords.longitude = value,
        }
        params.coords = Some(coords);
        self.write(params);
    }

    /// Stops tracking. Stored coordinates are left as they are.
    pub fn deactivate(&mut self) {
        self.release_watch();
        self.permission = PermissionState::Unrequested;
    }

    fn deny(&mut self) {
        self.release_watch();
        self.permission = PermissionState::Denied;
        let mut params = self.store.snapshot();
        params.coords = None;
        self.write(params);
    }

    fn release_watch(&mut self) {
        if let Some(handle) = self.watch.take() {
            debug!(watch_id = handle.id(), "clearing position watch");
            self.provider.cancel(handle);
        }
    }

    fn write(&mut self, params: SearchParams) {
        self.store.replace(params);
        let snapshot = self.store.snapshot();
        let next = evaluate(snapshot.default.as_ref(), snapshot.coords);
        if next.within_radius != self.proximity.within_radius {
            info!(
                distance_meters = next.distance_meters,
                within_radius = next.within_radius,
                "proximity changed"
            );
        }
        self.proximity = next;
    }
}

impl<P: GeolocationProvider, S: CoordinateStore> Drop for GeofenceMachine<P, S> {
    fn drop(&mut self) {
        self.release_watch();
    }
}
