//! Cart roster and nearest-cart selection.
//!
//! The roster is an externally supplied, ordered, fixed set of carts; there
//! is no update protocol. The demo data below covers downtown Cincinnati with
//! the stadium as the fixed destination, matching the service the original
//! deployment ran.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::geo::{self, GeoPoint};

/// A dispatchable shuttle cart with a fixed or last-known position.
///
/// The roster record itself is never mutated; a cart's animated position
/// during a ride is transient driver state layered on top for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
}

impl Cart {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
        }
    }
}

/// A named fixed location, such as the ride destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub name: &'static str,
    pub position: GeoPoint,
}

/// The fixed ride destination.
pub const STADIUM: Landmark = Landmark {
    name: "Great American Ball Park",
    position: GeoPoint::new(39.0978, -84.5086),
};

/// Downtown service-area boundary, closed ring, counter-clockwise.
pub const SERVICE_AREA: &[GeoPoint] = &[
    GeoPoint::new(39.1205, -84.5275),
    GeoPoint::new(39.1205, -84.4975),
    GeoPoint::new(39.1080, -84.4920),
    GeoPoint::new(39.0940, -84.4990),
    GeoPoint::new(39.0940, -84.5230),
    GeoPoint::new(39.1080, -84.5320),
];

/// The demo cart fleet, ordered as provisioned.
pub fn demo_roster() -> Vec<Cart> {
    vec![
        Cart::new("cart-1", "Findlay Market Cart", GeoPoint::new(39.1116, -84.5158)),
        Cart::new("cart-2", "Fountain Square Cart", GeoPoint::new(39.1020, -84.5120)),
        Cart::new("cart-3", "Washington Park Cart", GeoPoint::new(39.1088, -84.5180)),
    ]
}

/// Select the cart nearest to `origin` by great-circle distance.
///
/// Linear scan; on an exact tie the first candidate in roster order wins.
/// An empty roster is a normal "no resource available" condition and returns
/// [`DispatchError::EmptyCandidateSet`].
pub fn nearest(origin: GeoPoint, candidates: &[Cart]) -> Result<(&Cart, f64), DispatchError> {
    let mut best: Option<(&Cart, f64)> = None;

    for cart in candidates {
        let distance = geo::distance_meters(origin, cart.position);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((cart, distance));
        }
    }

    best.ok_or(DispatchError::EmptyCandidateSet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_at(id: &str, position: GeoPoint) -> Cart {
        Cart::new(id, id, position)
    }

    #[test]
    fn test_picks_minimum_distance() {
        let origin = GeoPoint::new(39.1031, -84.512);
        // Roughly 500 m north, 1200 m east, 300 m south of the origin.
        let carts = vec![
            cart_at("far", GeoPoint::new(39.1076, -84.512)),
            cart_at("farther", GeoPoint::new(39.1031, -84.498)),
            cart_at("near", GeoPoint::new(39.1004, -84.512)),
        ];

        let (cart, distance) = nearest(origin, &carts).expect("non-empty roster");
        assert_eq!(cart.id, "near");
        assert!(distance > 250.0 && distance < 350.0, "got {} m", distance);
    }

    #[test]
    fn test_tie_keeps_first_in_order() {
        let origin = GeoPoint::new(0.0, 0.0);
        let carts = vec![
            cart_at("first", GeoPoint::new(0.0, 1.0)),
            cart_at("second", GeoPoint::new(0.0, 1.0)),
        ];

        let (cart, _) = nearest(origin, &carts).expect("non-empty roster");
        assert_eq!(cart.id, "first");
    }

    #[test]
    fn test_empty_roster() {
        let result = nearest(GeoPoint::new(0.0, 0.0), &[]);
        assert!(matches!(result, Err(DispatchError::EmptyCandidateSet)));
    }

    #[test]
    fn test_demo_roster_is_ordered() {
        let roster = demo_roster();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].id, "cart-1");
        assert_eq!(roster[2].id, "cart-3");
    }
}
