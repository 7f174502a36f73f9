//! Ride driver: owns the state machine, the timer handles, and the seams to
//! the host application.
//!
//! The driver is single-threaded and cooperative. The host's timer framework
//! implements [`Scheduler`]; when its repeating timer fires it calls
//! [`RideDriver::tick`], and when the one-shot pause fires it calls
//! [`RideDriver::pause_elapsed`]. The driver holds at most one live handle of
//! each kind and cancels the previous one before storing a replacement, so no
//! two tick sources ever overlap.

use tracing::{debug, info};

use crate::directions::DirectionsProvider;
use crate::error::{DispatchError, DispatchResult};
use crate::geo::{self, GeoPoint};
use crate::ride::{AnimationTick, Effect, Event, PickupRequest, RideFlow, RideState};
use crate::roster::{self, Cart};
use crate::route::{Route, RouteLeg};

/// A cancellable scheduled task. Cancelling is idempotent: calling it on an
/// already-fired or already-cancelled handle is safe and does nothing.
pub trait CancelHandle {
    fn cancel(&mut self);
}

/// Timer seam implemented by the host.
///
/// `repeating` arranges for [`RideDriver::tick`] to be invoked every
/// `interval` until the returned handle is cancelled; `once` arranges a
/// single [`RideDriver::pause_elapsed`] after `delay`.
pub trait Scheduler {
    type Handle: CancelHandle;

    fn repeating(&mut self, interval: std::time::Duration) -> Self::Handle;
    fn once(&mut self, delay: std::time::Duration) -> Self::Handle;
}

/// The requester's position, or `None` while no fix is available
/// (permission pending, cold GPS). Absence is a normal condition.
pub trait PositionSource {
    fn current_position(&self) -> Option<GeoPoint>;
}

/// Callbacks for ride progress. All methods default to no-ops so hosts only
/// override what they render.
pub trait RideObserver {
    fn state_changed(&mut self, _from: RideState, _to: RideState) {}

    /// A new interpolated position along the active leg.
    fn position_changed(&mut self, _tick: &AnimationTick) {}

    /// The transient animated position is gone (ride completed or cancelled).
    fn position_cleared(&mut self) {}
}

/// A [`RideObserver`] that ignores everything.
pub struct NoopObserver;

impl RideObserver for NoopObserver {}

/// Drives one ride at a time from request through completion.
pub struct RideDriver<D, P, S, O>
where
    D: DirectionsProvider,
    P: PositionSource,
    S: Scheduler,
    O: RideObserver,
{
    flow: RideFlow,
    roster: Vec<Cart>,
    destination: GeoPoint,
    directions: D,
    positions: P,
    scheduler: S,
    observer: O,
    ticker: Option<S::Handle>,
    pause: Option<S::Handle>,
    animated_position: Option<GeoPoint>,
}

impl<D, P, S, O> RideDriver<D, P, S, O>
where
    D: DirectionsProvider,
    P: PositionSource,
    S: Scheduler,
    O: RideObserver,
{
    pub fn new(
        roster: Vec<Cart>,
        destination: GeoPoint,
        directions: D,
        positions: P,
        scheduler: S,
        observer: O,
    ) -> Self {
        Self {
            flow: RideFlow::new(),
            roster,
            destination,
            directions,
            positions,
            scheduler,
            observer,
            ticker: None,
            pause: None,
            animated_position: None,
        }
    }

    pub fn state(&self) -> RideState {
        self.flow.state()
    }

    pub fn selected_cart(&self) -> Option<&Cart> {
        self.flow.selected_cart()
    }

    pub fn route(&self) -> Option<&Route> {
        self.flow.route()
    }

    /// The leg currently being animated, for ETA/distance display.
    pub fn active_leg(&self) -> Option<&RouteLeg> {
        let index = self.flow.active_leg()?;
        self.flow.route()?.leg(index)
    }

    /// The cart's transient display position while a ride is animating.
    pub fn animated_position(&self) -> Option<GeoPoint> {
        self.animated_position
    }

    /// Request a pickup to the configured destination.
    ///
    /// Selects the nearest cart to the requester, then asks the directions
    /// oracle for the cart→requester→destination route. On success the
    /// pickup-leg animation starts; on any failure the driver is back in
    /// `Idle` with no cart selected, and the error is returned once — the
    /// caller decides whether the user retries.
    pub fn request_pickup(&mut self) -> DispatchResult<()> {
        if self.flow.state() != RideState::Idle {
            debug!(state = ?self.flow.state(), "pickup request ignored, ride already active");
            return Ok(());
        }

        let Some(requester) = self.positions.current_position() else {
            return Err(DispatchError::LocationUnavailable);
        };

        let (cart, distance) = roster::nearest(requester, &self.roster)?;
        let cart = cart.clone();
        info!(
            cart = %cart.name,
            "nearest cart {:.2} miles away ({:.0} m)",
            geo::meters_to_miles(distance),
            distance
        );

        self.dispatch(Event::Request(PickupRequest {
            cart: cart.clone(),
            requester,
            destination: self.destination,
        }));

        match self
            .directions
            .two_leg_route(cart.position, requester, self.destination)
        {
            Ok(route) => {
                self.dispatch(Event::RouteReady(route));
                Ok(())
            }
            Err(err) => {
                self.dispatch(Event::RouteFailed);
                Err(err)
            }
        }
    }

    /// Abandon the active ride, if any. Stops all pending timers.
    pub fn cancel(&mut self) {
        self.dispatch(Event::Cancel);
    }

    /// Dismiss a completed ride, returning to `Idle`.
    pub fn acknowledge(&mut self) {
        self.dispatch(Event::Acknowledge);
    }

    /// Host timer entry point for the repeating animation timer.
    pub fn tick(&mut self) {
        self.dispatch(Event::Tick);
    }

    /// Host timer entry point for the one-shot pickup pause.
    pub fn pause_elapsed(&mut self) {
        self.dispatch(Event::PauseElapsed);
    }

    fn dispatch(&mut self, event: Event) {
        let from = self.flow.state();
        let effects = self.flow.apply(event);
        for effect in effects {
            self.run_effect(effect);
        }

        let to = self.flow.state();
        if from != to {
            debug!(?from, ?to, "ride state changed");
            self.observer.state_changed(from, to);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartTicking { interval } => {
                self.stop_ticker();
                self.ticker = Some(self.scheduler.repeating(interval));
            }
            Effect::StopTicking => self.stop_ticker(),
            Effect::StartPause { duration } => {
                self.stop_pause();
                self.pause = Some(self.scheduler.once(duration));
            }
            Effect::CancelPause => self.stop_pause(),
            Effect::Position(tick) => {
                self.animated_position = Some(tick.position);
                self.observer.position_changed(&tick);
            }
            Effect::ClearPosition => {
                self.animated_position = None;
                self.observer.position_cleared();
            }
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(mut handle) = self.ticker.take() {
            handle.cancel();
        }
    }

    fn stop_pause(&mut self) {
        if let Some(mut handle) = self.pause.take() {
            handle.cancel();
        }
    }
}
