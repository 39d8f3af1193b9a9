use std::io::{self, Write};

pub use distance::{distance, GeoPoint, EARTH_RADIUS_METERS};
pub use error::{GeofenceError, PositionError, PositionErrorKind};
pub use machine::{field_value, CoordinateField, GeofenceMachine, PermissionState, ZoneField};
pub use provider::{GeolocationProvider, PositionEvent, ReplayProvider, TrackEntry, WatchHandle};
pub use report::{FillColor, MapView, StatusReport};
pub use store::{CoordinateStore, SearchParams, UrlStore};
pub use zone::{evaluate, DefaultZone, ProximityResult};

pub mod distance;
pub mod error;
pub mod machine;
pub mod provider;
pub mod report;
pub mod store;
pub mod zone;

/// Requests permission, plays every queued event through the machine and
/// writes one status line per step. Returns the final navigational URL.
pub fn run<W: Write>(
    url: &str,
    provider: ReplayProvider,
    json: bool,
    out: &mut W,
) -> Result<String, GeofenceError> {
    let store = UrlStore::parse(url)?;
    let mut machine = GeofenceMachine::new(provider, store);

    match machine.request_permission() {
        // Already logged; the status below shows the degraded state
        Ok(()) | Err(GeofenceError::CapabilityUnavailable) => {}
        Err(e) => return Err(e),
    }
    write_status(out, &machine.status(), json)?;

    while let Some(event) = machine.provider_mut().poll() {
        machine.handle_event(event);
        write_status(out, &machine.status(), json)?;
    }

    machine.deactivate();
    Ok(machine.store().to_string())
}

fn write_status<W: Write>(out: &mut W, status: &StatusReport, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, status)?;
        writeln!(out)
    } else {
        writeln!(out, "{}\t{}", status.permission, status)
    }
}
