//! Crate-wide error type.
//!
//! Every failure surfaces exactly once to the caller; nothing in this crate
//! retries on its own. `LocationUnavailable` and `EmptyCandidateSet` are
//! expected "not ready" conditions rather than faults — callers typically
//! prompt the user and try again later.

use thiserror::Error;

use crate::polyline::PolylineError;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requester's position is not yet known (permission pending, no fix).
    #[error("requester position not yet available")]
    LocationUnavailable,

    /// Nearest-cart selection ran against an empty roster.
    #[error("no carts available for dispatch")]
    EmptyCandidateSet,

    /// The directions oracle answered with a non-success status, or the
    /// response was unusable (no routes, wrong leg count, empty geometry).
    #[error("directions request failed: {0}")]
    RouteFetch(String),

    /// A leg's encoded polyline could not be decoded.
    #[error("malformed route geometry: {0}")]
    Polyline(#[from] PolylineError),

    /// The HTTP call to the directions oracle failed.
    #[error("directions transport error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
