use std::fmt;

use serde::{Deserialize, Serialize};

use crate::machine::PermissionState;

/// Errors surfaced by the geofence machine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum GeofenceError {
    #[error("geolocation is not supported by this host")]
    CapabilityUnavailable,

    #[error("permission request not allowed while {0}")]
    RequestInFlight(PermissionState),

    #[error("location error: {0}")]
    Position(#[from] PositionError),

    #[error("invalid navigation url: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid track entry on line {line}: {source}")]
    Track {
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl PositionErrorKind {
    /// Maps the W3C GeolocationPositionError codes
    pub fn from_code(code: u16) -> PositionErrorKind {
        match code {
            1 => PositionErrorKind::PermissionDenied,
            3 => PositionErrorKind::Timeout,
            _ => PositionErrorKind::PositionUnavailable,
        }
    }
}

impl fmt::Display for PositionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionErrorKind::PermissionDenied => write!(f, "permission denied"),
            PositionErrorKind::PositionUnavailable => write!(f, "position unavailable"),
            PositionErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// A failure reported by the geolocation provider
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct PositionError {
    pub kind: PositionErrorKind,
    pub message: String,
}

impl PositionError {
    pub fn new(kind: PositionErrorKind, message: impl Into<String>) -> PositionError {
        PositionError {
            kind,
            message: message.into(),
        }
    }
}
