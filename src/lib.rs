//! cart-dispatch core
//!
//! Geometry utilities, nearest-cart selection, a directions-oracle adapter,
//! and the timer-driven ride animation state machine behind a shuttle-cart
//! pickup demo. Rendering, permissions, and real timers live with the host.

pub mod directions;
pub mod driver;
pub mod error;
pub mod geo;
pub mod polyline;
pub mod ride;
pub mod roster;
pub mod route;
