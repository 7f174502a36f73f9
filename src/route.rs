//! Route legs and progress-based interpolation along their geometry.

use serde::{Deserialize, Serialize};

use crate::geo::{self, GeoPoint};

/// One directed leg of a route between two consecutive stops.
///
/// `distance_text` and `duration_text` are display strings from the
/// directions oracle, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_text: String,
    pub duration_text: String,
    points: Vec<GeoPoint>,
}

impl RouteLeg {
    pub fn new(
        distance_text: impl Into<String>,
        duration_text: impl Into<String>,
        points: Vec<GeoPoint>,
    ) -> Self {
        Self {
            distance_text: distance_text.into(),
            duration_text: duration_text.into(),
            points,
        }
    }

    /// The leg geometry, ordered start to end.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

/// An ordered sequence of legs. Pickup routes carry exactly two:
/// cart to requester, then requester to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    legs: Vec<RouteLeg>,
}

impl Route {
    pub fn new(legs: Vec<RouteLeg>) -> Self {
        Self { legs }
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    pub fn leg(&self, index: usize) -> Option<&RouteLeg> {
        self.legs.get(index)
    }

    /// Whether consecutive legs join up: the last point of each leg lies
    /// within `tolerance_m` meters of the next leg's first point.
    ///
    /// Vacuously true for fewer than two legs; a leg with no geometry fails.
    pub fn is_contiguous(&self, tolerance_m: f64) -> bool {
        self.legs.windows(2).all(|pair| {
            match (pair[0].points().last(), pair[1].points().first()) {
                (Some(&end), Some(&start)) => geo::distance_meters(end, start) <= tolerance_m,
                _ => false,
            }
        })
    }
}

/// Interpolate a position along `points` at normalized `progress` in [0, 1].
///
/// The sequence is treated as `n - 1` segments each spanning an equal share
/// of progress, regardless of geographic length. This is linear-in-index, not
/// distance-weighted: traversal speeds up over long segments and slows over
/// short ones. A known approximation, kept as is.
///
/// Progress outside [0, 1] clamps to the endpoints. An empty slice returns
/// the `(0, 0)` sentinel; callers are expected to pass decoded route
/// geometry, which is never empty.
pub fn point_at(points: &[GeoPoint], progress: f64) -> GeoPoint {
    let Some((&first, rest)) = points.split_first() else {
        return GeoPoint::new(0.0, 0.0);
    };
    if rest.is_empty() || progress <= 0.0 {
        return first;
    }
    if progress >= 1.0 {
        return points[points.len() - 1];
    }

    let segments = (points.len() - 1) as f64;
    let target = progress * segments;
    let lower = target.floor() as usize;
    let upper = (lower + 1).min(points.len() - 1);
    let fraction = target - lower as f64;

    let a = points[lower];
    let b = points[upper];

    GeoPoint::new(
        a.latitude + (b.latitude - a.latitude) * fraction,
        a.longitude + (b.longitude - a.longitude) * fraction,
    )
}
