//! Test fixtures for cart-dispatch.
//!
//! Provides real downtown Cincinnati locations (from OpenStreetMap) for
//! realistic ride scenarios.

pub mod downtown_locations;

pub use downtown_locations::*;
