use thiserror::Error;

use crate::EntityKind;

/// Why an inbound record did not make it into the store.
///
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Rejection {
    #[error("Malformed message: {0}")]
    Malformed(String),
    #[error("No identifier in {0} record")]
    MissingId(EntityKind),
    #[error("No usable position for {0} {1}")]
    NoPosition(EntityKind, String),
    #[error("Unknown officer {0}")]
    UnknownOfficer(String),
}

/// Stream transport errors.
///
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Can not connect to {0}: {1}")]
    Connect(String, String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// User-facing dispatch errors.
///
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("No drone selected.")]
    NoDroneSelected,
    #[error("No drones available for dispatch.")]
    EmptyFleet,
}

/// Backend REST errors.
///
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Bad backend URL {0}")]
    BadUrl(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Backend returned {0} for {1}")]
    Status(u16, String),
}
