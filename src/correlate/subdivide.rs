//! Adaptive quad-tree partitioning of a disparity estimate into zones.
//!
//! A region is split into quadrants when the summed search work of the
//! quadrants (window area times padded pixel count) is at most 90% of the
//! work of searching the region as a whole. A region that fails the test gets
//! one retry per quadrant; quadrants that fail again are folded back together
//! where they line up and share a window.

use crate::disparity::DisparityMap;
use crate::geom::{BBox, Vec2};

/// Regions with at most this many pixels are never split.
pub const MIN_SPLIT_AREA: i64 = 200;
/// Regions narrower or shorter than this are never split.
pub const MIN_SPLIT_SIDE: i32 = 16;
/// A split must cost at most this fraction of the unsplit region.
pub const SPLIT_GAIN: f64 = 0.9;
/// Recursion guard; deeper regions are treated as terminal.
const MAX_DEPTH: u32 = 32;

/// Output region paired with its search window.
///
/// The window is half-open; an empty window means the region had no valid
/// disparity samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Zone {
    /// Output region, in disparity-map pixels.
    pub region: BBox,
    /// Displacements to search, `[min, max)`.
    pub window: BBox,
}

impl Zone {
    /// Creates a zone.
    pub fn new(region: BBox, window: BBox) -> Self {
        Self { region, window }
    }
}

/// Partitions `region` of `disparity` into zones with tight search windows.
///
/// Terminal regions without valid samples produce no zone, so the result
/// covers `region` exactly only where the estimate has data.
pub fn subdivide_regions(disparity: &DisparityMap, region: BBox, kernel: Vec2) -> Vec<Zone> {
    let mut zones = Vec::new();
    let splitter = Splitter { disparity, kernel };
    splitter.visit(region, false, 0, &mut zones);
    zones
}

/// Returns the quadrants of `region` in the order top-left, top-right,
/// bottom-left, bottom-right.
pub fn quadrants(region: BBox) -> [BBox; 4] {
    let split = region.size() / 2;
    let (min, max) = (region.min, region.max);
    let mid = min + split;
    [
        BBox::new(min, mid),
        BBox::new(Vec2::new(mid.x, min.y), Vec2::new(max.x, mid.y)),
        BBox::new(Vec2::new(min.x, mid.y), Vec2::new(mid.x, max.y)),
        BBox::new(mid, max),
    ]
}

fn is_terminal(region: BBox) -> bool {
    region.area() <= MIN_SPLIT_AREA
        || region.width() < MIN_SPLIT_SIDE
        || region.height() < MIN_SPLIT_SIDE
}

struct Splitter<'a> {
    disparity: &'a DisparityMap,
    kernel: Vec2,
}

impl Splitter<'_> {
    fn window(&self, region: BBox) -> BBox {
        self.disparity.observed_window(region).unwrap_or_default()
    }

    fn work(&self, region: BBox, window: BBox) -> i64 {
        window.area() * (region.size() + self.kernel).prod()
    }

    /// Emits zones for `region`; returns false when a retry fails, in which
    /// case nothing was emitted.
    fn visit(&self, region: BBox, retry: bool, depth: u32, zones: &mut Vec<Zone>) -> bool {
        if is_terminal(region) || depth >= MAX_DEPTH {
            if let Some(window) = self.disparity.observed_window(region) {
                zones.push(Zone::new(region, window));
            }
            return true;
        }

        let quads = quadrants(region);
        let windows = quads.map(|q| self.window(q));
        let split_work: i64 = quads
            .iter()
            .zip(&windows)
            .map(|(q, w)| self.work(*q, *w))
            .sum();
        let whole = windows
            .iter()
            .filter(|w| !w.is_empty())
            .copied()
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let whole_work = self.work(region, whole);

        if split_work as f64 <= SPLIT_GAIN * whole_work as f64 {
            for q in quads {
                self.visit(q, false, depth + 1, zones);
            }
            return true;
        }
        if retry {
            return false;
        }

        let mut failed = Vec::with_capacity(4);
        for (q, w) in quads.into_iter().zip(windows) {
            if !self.visit(q, true, depth + 1, zones) {
                failed.push(Zone::new(q, w));
            }
        }
        fold_failed(Zone::new(region, whole), &failed, zones);
        true
    }
}

/// Joins two failed quadrants when they line up on an axis and share a window.
fn merged(a: &Zone, b: &Zone) -> Option<Zone> {
    let aligned = a.region.min.x == b.region.min.x || a.region.min.y == b.region.min.y;
    (aligned && a.window == b.window).then(|| Zone::new(a.region.union(&b.region), a.window))
}

fn fold_failed(whole: Zone, failed: &[Zone], zones: &mut Vec<Zone>) {
    match failed {
        [] => {}
        [only] => zones.push(*only),
        [a, b] => match merged(a, b) {
            Some(m) => zones.push(m),
            None => zones.extend([*a, *b]),
        },
        [a, b, c] => {
            if let Some(m) = merged(a, b) {
                zones.extend([m, *c]);
            } else if let Some(m) = merged(b, c) {
                zones.extend([m, *a]);
            } else if let Some(m) = merged(a, c) {
                zones.extend([m, *b]);
            } else {
                zones.extend([*a, *b, *c]);
            }
        }
        _ => zones.push(whole),
    }
}
