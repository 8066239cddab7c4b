//! Left/right consistency checking.
//!
//! A forward match `d` at pixel `p` is kept only when the reverse map at
//! `p + d` points back close to `p`, i.e. `d + reverse(p + d)` is within the
//! threshold. Both maps must share a frame in which the reverse map is
//! indexed by the forward match position.

use crate::disparity::DisparityMap;
use crate::geom::Vec2;
use crate::trace::trace_event;

/// Distance used to compare a round trip against the threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsistencyDistance {
    /// Each axis separately (Chebyshev distance).
    #[default]
    PerAxis,
    /// Euclidean length of the round-trip vector.
    Euclidean,
}

impl ConsistencyDistance {
    fn within(self, round_trip: Vec2, threshold: f32) -> bool {
        match self {
            Self::PerAxis => {
                (round_trip.x.unsigned_abs() as f32) <= threshold
                    && (round_trip.y.unsigned_abs() as f32) <= threshold
            }
            Self::Euclidean => {
                let (x, y) = (round_trip.x as f32, round_trip.y as f32);
                (x * x + y * y).sqrt() <= threshold
            }
        }
    }
}

/// An enabled consistency check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConsistencyCheck {
    threshold: f32,
    distance: ConsistencyDistance,
}

impl ConsistencyCheck {
    /// Returns `None` when `threshold` disables the check (negative or NaN).
    pub fn new(threshold: f32, distance: ConsistencyDistance) -> Option<Self> {
        (threshold >= 0.0).then_some(Self {
            threshold,
            distance,
        })
    }

    /// Maximum accepted round-trip distance.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Distance metric used for the round trip.
    pub fn distance(&self) -> ConsistencyDistance {
        self.distance
    }

    /// Invalidates forward pixels that fail the round trip.
    ///
    /// Forward pixels whose match lands outside the reverse map, or on an
    /// invalid reverse pixel, are invalidated as well. The reverse map is
    /// never modified. Returns the number of newly invalidated pixels.
    pub fn apply(&self, forward: &mut DisparityMap, reverse: &DisparityMap) -> usize {
        let mut rejected = 0usize;
        for y in 0..forward.height() {
            for x in 0..forward.width() {
                let Some(d) = forward.get(x, y).and_then(|px| px.get()) else {
                    continue;
                };
                let target = Vec2::new(x as i32, y as i32) + d;
                let keep = reverse
                    .get_at(target)
                    .and_then(|px| px.get())
                    .is_some_and(|r| self.distance.within(d + r, self.threshold));
                if !keep {
                    forward.invalidate(x, y);
                    rejected += 1;
                }
            }
        }
        trace_event!("consistency_check", rejected = rejected);
        rejected
    }
}

/// Runs the consistency check with per-axis distance.
///
/// A negative `threshold` disables the check and leaves `forward` untouched.
/// Returns the number of invalidated pixels.
pub fn cross_corr_consistency_check(
    forward: &mut DisparityMap,
    reverse: &DisparityMap,
    threshold: f32,
) -> usize {
    match ConsistencyCheck::new(threshold, ConsistencyDistance::PerAxis) {
        Some(check) => check.apply(forward, reverse),
        None => 0,
    }
}
