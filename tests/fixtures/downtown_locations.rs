//! Real downtown Cincinnati locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Everything sits inside the demo
//! service area, within a couple of kilometers of the ballpark.

use cart_dispatch::geo::GeoPoint;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

// ============================================================================
// Cart stands (fleet start positions)
// ============================================================================

pub const CART_STANDS: &[Place] = &[
    Place::new("Findlay Market", 39.1116, -84.5158),
    Place::new("Fountain Square", 39.1020, -84.5120),
    Place::new("Washington Park", 39.1088, -84.5180),
];

// ============================================================================
// Rider pickup spots
// ============================================================================

pub const RIDER_SPOTS: &[Place] = &[
    Place::new("21c Museum Hotel", 39.1043, -84.5123),
    Place::new("Music Hall", 39.1092, -84.5190),
    Place::new("Smale Riverfront Park", 39.0963, -84.5130),
];

// ============================================================================
// Destination
// ============================================================================

pub const BALLPARK: Place = Place::new("Great American Ball Park", 39.0978, -84.5086);
