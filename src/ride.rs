//! Ride lifecycle state machine.
//!
//! `RideFlow` is a pure finite-state value: it knows nothing about timers,
//! HTTP, or rendering. Callers feed it [`Event`]s and execute the returned
//! [`Effect`]s — start or stop a repeating ticker, arm or cancel the pickup
//! pause, publish or clear the animated position. The driver in
//! [`crate::driver`] wires those effects to a scheduler and an observer.
//!
//! Events that are not meaningful in the current state are ignored without
//! effects, so a tick delivered late by a misbehaving timer cannot revive a
//! cancelled ride.

use std::time::Duration;

use tracing::debug;

use crate::geo::GeoPoint;
use crate::roster::Cart;
use crate::route::{self, Route};

/// Simulated travel time for the cart-to-requester leg.
pub const PICKUP_LEG_DURATION: Duration = Duration::from_secs(15);

/// Simulated travel time for the requester-to-destination leg.
pub const DROPOFF_LEG_DURATION: Duration = Duration::from_secs(20);

/// Wall-clock spacing between animation ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Hold at the pickup point before the drop-off leg starts.
pub const PICKUP_PAUSE: Duration = Duration::from_secs(2);

/// Animation progress is logged every this many ticks.
const PROGRESS_LOG_STRIDE: u32 = 50;

const fn leg_ticks(duration: Duration) -> u32 {
    (duration.as_millis() / TICK_INTERVAL.as_millis()) as u32
}

/// Lifecycle of the single active ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideState {
    Idle,
    Requesting,
    EnRouteToRequester,
    AtPickup,
    Completed,
}

/// What the caller asked for: the selected cart, where the requester stands,
/// and where the ride ends.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupRequest {
    pub cart: Cart,
    pub requester: GeoPoint,
    pub destination: GeoPoint,
}

/// One interpolated position along the active leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTick {
    /// Index of the leg being traversed: 0 pickup, 1 drop-off.
    pub leg: usize,
    /// Normalized completion of that leg, in [0, 1].
    pub progress: f64,
    pub position: GeoPoint,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A pickup was requested and a cart selected; route fetch is under way.
    Request(PickupRequest),
    /// The directions oracle produced the two-leg route.
    RouteReady(Route),
    /// The directions oracle failed; the attempt is over.
    RouteFailed,
    /// The repeating animation timer fired.
    Tick,
    /// The pickup-point pause elapsed.
    PauseElapsed,
    /// The requester abandoned the ride.
    Cancel,
    /// The requester dismissed the completion notice.
    Acknowledge,
}

/// Side-effect requests returned by [`RideFlow::apply`].
///
/// At most one repeating ticker and one pause may be live at a time; the
/// machine always emits the stop for the old timer before the start of a new
/// one.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartTicking { interval: Duration },
    StopTicking,
    StartPause { duration: Duration },
    CancelPause,
    Position(AnimationTick),
    ClearPosition,
}

/// The ride state machine. One instance models one session's single ride.
#[derive(Debug, Clone, PartialEq)]
pub struct RideFlow {
    state: RideState,
    request: Option<PickupRequest>,
    route: Option<Route>,
    tick: u32,
    total_ticks: u32,
    pausing: bool,
}

impl Default for RideFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RideFlow {
    pub fn new() -> Self {
        Self {
            state: RideState::Idle,
            request: None,
            route: None,
            tick: 0,
            total_ticks: 0,
            pausing: false,
        }
    }

    pub fn state(&self) -> RideState {
        self.state
    }

    /// The cart serving the active ride, if any.
    pub fn selected_cart(&self) -> Option<&Cart> {
        self.request.as_ref().map(|request| &request.cart)
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Index of the leg currently being animated.
    pub fn active_leg(&self) -> Option<usize> {
        match self.state {
            RideState::EnRouteToRequester => Some(0),
            RideState::AtPickup => Some(1),
            _ => None,
        }
    }

    /// Advance the machine. Returns the side effects to execute, in order.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match (self.state, event) {
            (RideState::Idle, Event::Request(request)) => {
                self.state = RideState::Requesting;
                self.request = Some(request);
                Vec::new()
            }

            (RideState::Requesting, Event::RouteReady(route)) => {
                let Some(start) = self.request.as_ref().map(|request| request.cart.position)
                else {
                    return Vec::new();
                };
                self.route = Some(route);
                self.begin_leg(RideState::EnRouteToRequester, 0, PICKUP_LEG_DURATION, start)
            }

            (RideState::Requesting, Event::RouteFailed) => {
                self.reset();
                Vec::new()
            }

            (
                RideState::Requesting | RideState::EnRouteToRequester | RideState::AtPickup,
                Event::Cancel,
            ) => {
                self.reset();
                vec![Effect::StopTicking, Effect::CancelPause, Effect::ClearPosition]
            }

            (RideState::EnRouteToRequester, Event::Tick) if !self.pausing => {
                self.advance_leg(0)
            }

            (RideState::EnRouteToRequester, Event::PauseElapsed) if self.pausing => {
                self.pausing = false;
                let Some(requester) = self.request.as_ref().map(|request| request.requester)
                else {
                    return Vec::new();
                };
                // Release the fired pause handle before the next leg starts.
                let mut effects = vec![Effect::CancelPause];
                effects.extend(self.begin_leg(
                    RideState::AtPickup,
                    1,
                    DROPOFF_LEG_DURATION,
                    requester,
                ));
                effects
            }

            (RideState::AtPickup, Event::Tick) => self.advance_leg(1),

            (RideState::Completed, Event::Acknowledge) => {
                self.reset();
                Vec::new()
            }

            // Anything else is stale or out of order; ignore it.
            _ => Vec::new(),
        }
    }

    /// Enter an animating state: publish the leg's starting position and ask
    /// for a fresh ticker.
    fn begin_leg(
        &mut self,
        state: RideState,
        leg: usize,
        duration: Duration,
        start: GeoPoint,
    ) -> Vec<Effect> {
        self.state = state;
        self.tick = 0;
        self.total_ticks = leg_ticks(duration);
        debug!(?state, leg, total_ticks = self.total_ticks, "starting leg animation");
        vec![
            Effect::Position(AnimationTick {
                leg,
                progress: 0.0,
                position: start,
            }),
            Effect::StartTicking {
                interval: TICK_INTERVAL,
            },
        ]
    }

    fn advance_leg(&mut self, leg: usize) -> Vec<Effect> {
        self.tick += 1;
        let progress = f64::from(self.tick) / f64::from(self.total_ticks);

        if self.tick % PROGRESS_LOG_STRIDE == 0 {
            debug!("leg {} progress {:.1}%", leg, progress * 100.0);
        }

        if progress >= 1.0 {
            return self.finish_leg(leg);
        }

        let geometry = self
            .route
            .as_ref()
            .and_then(|route| route.leg(leg))
            .map(|route_leg| route_leg.points())
            .unwrap_or_default();
        let position = route::point_at(geometry, progress);

        vec![Effect::Position(AnimationTick {
            leg,
            progress,
            position,
        })]
    }

    /// A leg hit progress 1: land exactly on the stop, then either hold for
    /// the pickup pause or complete the ride.
    fn finish_leg(&mut self, leg: usize) -> Vec<Effect> {
        let Some(request) = self.request.as_ref() else {
            self.reset();
            return vec![Effect::StopTicking, Effect::ClearPosition];
        };

        match leg {
            0 => {
                self.pausing = true;
                let arrival = AnimationTick {
                    leg,
                    progress: 1.0,
                    position: request.requester,
                };
                debug!("cart reached requester, holding at pickup");
                vec![
                    Effect::StopTicking,
                    Effect::Position(arrival),
                    Effect::StartPause {
                        duration: PICKUP_PAUSE,
                    },
                ]
            }
            _ => {
                let arrival = AnimationTick {
                    leg,
                    progress: 1.0,
                    position: request.destination,
                };
                self.state = RideState::Completed;
                debug!("ride complete");
                vec![
                    Effect::StopTicking,
                    Effect::Position(arrival),
                    Effect::ClearPosition,
                ]
            }
        }
    }

    fn reset(&mut self) {
        self.state = RideState::Idle;
        self.request = None;
        self.route = None;
        self.tick = 0;
        self.total_ticks = 0;
        self.pausing = false;
    }
}
