use std::{collections::VecDeque, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance::GeoPoint;
use crate::error::{GeofenceError, PositionError, PositionErrorKind};

/// Token for a continuous position subscription.
/// Not `Clone`: cancelling consumes it, so it can only be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct WatchHandle(u64);

impl WatchHandle {
    pub fn new(id: u64) -> WatchHandle {
        WatchHandle(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    Fix(GeoPoint),
    Error(PositionError),
}

pub trait GeolocationProvider {
    /// Whether the host exposes a geolocation capability at all
    fn is_available(&self) -> bool;

    /// Ask for a single fix
    fn request_once(&mut self) -> Result<(), GeofenceError>;

    /// Start continuous updates
    fn subscribe(&mut self) -> Result<WatchHandle, GeofenceError>;

    fn cancel(&mut self, handle: WatchHandle);
}

/// One line of a recorded track
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TrackEntry {
    Fix {
        latitude: f64,
        longitude: f64,
    },
    Error {
        error: String,
        #[serde(default)]
        code: Option<u16>,
    },
}

impl From<TrackEntry> for PositionEvent {
    fn from(entry: TrackEntry) -> PositionEvent {
        match entry {
            TrackEntry::Fix {
                latitude,
                longitude,
            } => PositionEvent::Fix(GeoPoint::new(latitude, longitude)),
            TrackEntry::Error { error, code } => {
                let kind = code
                    .map(PositionErrorKind::from_code)
                    .unwrap_or(PositionErrorKind::PositionUnavailable);
                PositionEvent::Error(PositionError::new(kind, error))
            }
        }
    }
}

/// Parses a JSON Lines track. Blank lines and `#` comments are skipped.
pub fn parse_track(contents: &str) -> Result<Vec<TrackEntry>, GeofenceError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| GeofenceError::Track {
                line: i + 1,
                source,
            })
        })
        .collect()
}

/// Provider that plays back a recorded track.
///
/// An entry is only delivered while someone is listening: a pending
/// one-shot request or an active watch.
#[derive(Debug, Default)]
pub struct ReplayProvider {
    available: bool,
    entries: VecDeque<TrackEntry>,
    pending_once: bool,
    active_watch: Option<u64>,
    next_watch_id: u64,
    cancelled: Vec<u64>,
}

impl ReplayProvider {
    pub fn new(entries: Vec<TrackEntry>) -> ReplayProvider {
        ReplayProvider {
            available: true,
            entries: entries.into(),
            next_watch_id: 1,
            ..ReplayProvider::default()
        }
    }

    pub fn from_path(path: &Path) -> Result<ReplayProvider, GeofenceError> {
        let contents = fs::read_to_string(path)?;
        Ok(ReplayProvider::new(parse_track(&contents)?))
    }

    /// A host without geolocation support
    pub fn unavailable() -> ReplayProvider {
        ReplayProvider {
            available: false,
            ..ReplayProvider::new(Vec::new())
        }
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending_once
    }

    pub fn is_watching(&self) -> bool {
        self.active_watch.is_some()
    }

    /// Ids of every watch that has been cancelled, in order
    pub fn cancelled(&self) -> &[u64] {
        &self.cancelled
    }

    /// Next event for a listener, if any
    pub fn poll(&mut self) -> Option<PositionEvent> {
        if !self.pending_once && self.active_watch.is_none() {
            return None;
        }
        let entry = self.entries.pop_front()?;
        self.pending_once = false;
        Some(entry.into())
    }
}

impl GeolocationProvider for ReplayProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_once(&mut self) -> Result<(), GeofenceError> {
        if !self.available {
            return Err(GeofenceError::CapabilityUnavailable);
        }
        self.pending_once = true;
        Ok(())
    }

    fn subscribe(&mut self) -> Result<WatchHandle, GeofenceError> {
        if !self.available {
            return Err(GeofenceError::CapabilityUnavailable);
        }
        let id = self.next_watch_id;
        self.next_watch_id += 1;
        self.active_watch = Some(id);
        debug!(watch_id = id, "replay watch started");
        Ok(WatchHandle::new(id))
    }

    fn cancel(&mut self, handle: WatchHandle) {
        if self.active_watch == Some(handle.id()) {
            self.active_watch = None;
        }
        self.cancelled.push(handle.id());
        debug!(watch_id = handle.id(), "replay watch cancelled");
    }
}
