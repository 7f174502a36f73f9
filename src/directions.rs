//! Directions oracle: trait seam plus a Google-style HTTP adapter.
//!
//! The oracle takes an origin, one waypoint, and a destination, and answers
//! with a two-leg route (origin→waypoint, waypoint→destination). The adapter
//! here only consumes what the ride flow needs: each leg's distance/duration
//! display text and its step polylines, decoded and concatenated into the leg
//! geometry. Everything else in the response is ignored.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DispatchError, DispatchResult};
use crate::geo::GeoPoint;
use crate::polyline;
use crate::route::{Route, RouteLeg};

/// Legs whose endpoints sit farther apart than this are logged as suspect.
const CONTIGUITY_TOLERANCE_M: f64 = 50.0;

/// Produces a two-leg route through a single waypoint.
///
/// Implementations must return exactly two legs with non-empty geometry, or
/// an error. No retries: a failure is terminal for that request attempt.
pub trait DirectionsProvider {
    fn two_leg_route(
        &self,
        origin: GeoPoint,
        waypoint: GeoPoint,
        destination: GeoPoint,
    ) -> DispatchResult<Route>;
}

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Blocking HTTP client for the Google Directions API.
#[derive(Debug, Clone)]
pub struct GoogleDirections {
    config: DirectionsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleDirections {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl DirectionsProvider for GoogleDirections {
    fn two_leg_route(
        &self,
        origin: GeoPoint,
        waypoint: GeoPoint,
        destination: GeoPoint,
    ) -> DispatchResult<Route> {
        let url = format!(
            "{}?origin={}&destination={}&waypoints={}&key={}",
            self.config.base_url,
            coord_param(origin),
            coord_param(destination),
            coord_param(waypoint),
            self.config.api_key
        );

        let response = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json::<DirectionsResponse>()?;

        if response.status != "OK" {
            warn!(status = %response.status, "directions oracle returned failure status");
            return Err(DispatchError::RouteFetch(response.status));
        }

        let body = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| DispatchError::RouteFetch("response carried no routes".to_string()))?;

        route_from_legs(body.legs)
    }
}

fn coord_param(point: GeoPoint) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}

/// Assemble the wire legs into a validated two-leg [`Route`].
fn route_from_legs(legs: Vec<LegBody>) -> DispatchResult<Route> {
    if legs.len() != 2 {
        return Err(DispatchError::RouteFetch(format!(
            "expected 2 legs through the waypoint, got {}",
            legs.len()
        )));
    }

    let legs = legs
        .into_iter()
        .map(decode_leg)
        .collect::<Result<Vec<_>, _>>()?;

    let route = Route::new(legs);
    if !route.is_contiguous(CONTIGUITY_TOLERANCE_M) {
        warn!("route legs do not join at the waypoint");
    }

    Ok(route)
}

/// A leg's geometry is the concatenation of its steps' decoded polylines,
/// in step order.
fn decode_leg(leg: LegBody) -> DispatchResult<RouteLeg> {
    let mut points = Vec::new();
    for step in &leg.steps {
        points.extend(polyline::decode(&step.polyline.points)?);
    }

    if points.is_empty() {
        return Err(DispatchError::RouteFetch("leg carries no geometry".to_string()));
    }

    debug!(points = points.len(), distance = %leg.distance.text, "decoded leg");
    Ok(RouteLeg::new(leg.distance.text, leg.duration.text, points))
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<RouteBody>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    legs: Vec<LegBody>,
}

#[derive(Debug, Deserialize)]
struct LegBody {
    distance: TextField,
    duration: TextField,
    steps: Vec<StepBody>,
}

#[derive(Debug, Deserialize)]
struct TextField {
    text: String,
}

#[derive(Debug, Deserialize)]
struct StepBody {
    polyline: PolylineBody,
}

#[derive(Debug, Deserialize)]
struct PolylineBody {
    points: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(steps: &[&str]) -> LegBody {
        LegBody {
            distance: TextField {
                text: "0.8 mi".to_string(),
            },
            duration: TextField {
                text: "4 mins".to_string(),
            },
            steps: steps
                .iter()
                .map(|encoded| StepBody {
                    polyline: PolylineBody {
                        points: (*encoded).to_string(),
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_steps_concatenate_into_leg_geometry() {
        let route = route_from_legs(vec![
            leg(&["_p~iF~ps|U", "_ulLnnqC"]),
            leg(&["_p~iF~ps|U_ulLnnqC"]),
        ])
        .expect("two well-formed legs");

        // Two single-step decodes joined in order: the second step's deltas
        // restart from zero, so its point stands alone.
        let first = route.leg(0).unwrap();
        assert_eq!(first.points().len(), 2);
        assert_eq!(route.leg(1).unwrap().points().len(), 2);
        assert_eq!(first.distance_text, "0.8 mi");
        assert_eq!(first.duration_text, "4 mins");
    }

    #[test]
    fn test_wrong_leg_count_rejected() {
        let result = route_from_legs(vec![leg(&["_p~iF~ps|U"])]);
        assert!(matches!(result, Err(DispatchError::RouteFetch(_))));
    }

    #[test]
    fn test_empty_leg_geometry_rejected() {
        let result = route_from_legs(vec![leg(&[]), leg(&["_p~iF~ps|U"])]);
        assert!(matches!(result, Err(DispatchError::RouteFetch(_))));
    }

    #[test]
    fn test_malformed_step_polyline_propagates() {
        let result = route_from_legs(vec![leg(&["_p~iF~ps|"]), leg(&["_p~iF~ps|U"])]);
        assert!(matches!(result, Err(DispatchError::Polyline(_))));
    }

    #[test]
    fn test_failure_status_parses() {
        let body = r#"{"status": "ZERO_RESULTS", "routes": []}"#;
        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "ZERO_RESULTS");
        assert!(parsed.routes.is_empty());
    }
}
