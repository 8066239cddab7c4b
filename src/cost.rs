//! Patch cost metrics.
//!
//! Each metric is a zero-sized strategy implementing [`CostFunction`]. The
//! configuration-level [`CostMetric`] enum selects one at run time and the
//! block matcher is monomorphized per strategy. Lower is better for the
//! difference metrics and higher is better for cross-correlation;
//! [`CostFunction::is_better`] hides that from callers.

use crate::geom::Vec2;
use crate::image::filter::window_sums;
use crate::image::ImageView;

#[cfg(not(feature = "simd"))]
use crate::kernel::scalar as rows;
#[cfg(feature = "simd")]
use crate::kernel::simd as rows;

/// Relative variance floor below which an NCC window counts as flat.
const NCC_FLAT_VARIANCE: f32 = 1e-5;

/// Cost metric selected by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CostMetric {
    /// Sum of absolute differences.
    #[default]
    AbsoluteDifference,
    /// Sum of squared differences.
    SquaredDifference,
    /// Normalized cross-correlation.
    CrossCorrelation,
}

/// Reusable buffers for window scoring.
#[derive(Debug, Default)]
pub struct CostScratch {
    pixels: Vec<f32>,
    horiz: Vec<f32>,
    sum_r: Vec<f32>,
    sum_r2: Vec<f32>,
    sum_lr: Vec<f32>,
}

/// Scoring strategy for one cost metric.
pub trait CostFunction: Sync {
    /// Per-left-patch data reused across every displacement.
    type Plan: Sync;

    /// Precomputes displacement-independent data for `left`.
    fn plan(&self, left: ImageView<'_, f32>, kernel: Vec2) -> Self::Plan;

    /// Scores every `kernel`-sized window of a same-sized `left`/`right` pair.
    ///
    /// `out` receives `(w - kw + 1) * (h - kh + 1)` scores in row-major order.
    /// Non-finite scores mark degenerate windows.
    fn score_windows(
        &self,
        plan: &Self::Plan,
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        kernel: Vec2,
        scratch: &mut CostScratch,
        out: &mut Vec<f32>,
    );

    /// Scores a single same-sized patch pair.
    fn score(&self, left: ImageView<'_, f32>, right: ImageView<'_, f32>) -> f32;

    /// Returns true when `candidate` is strictly preferable to `incumbent`.
    fn is_better(&self, candidate: f32, incumbent: f32) -> bool;
}

/// Sum of absolute differences.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbsoluteCost;

/// Sum of squared differences.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredCost;

/// Normalized cross-correlation in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NccCost;

/// Window sums of the left patch and its square.
#[derive(Debug)]
pub struct NccPlan {
    sum_l: Vec<f32>,
    sum_l2: Vec<f32>,
}

/// Rows are always in bounds here; an empty row leaves the output untouched.
fn view_row<'a>(view: &ImageView<'a, f32>, y: usize) -> &'a [f32] {
    view.row(y).unwrap_or_default()
}

fn kernel_dims(kernel: Vec2) -> (usize, usize) {
    (kernel.x.max(1) as usize, kernel.y.max(1) as usize)
}

/// Fills `scratch.pixels` with `op(left, right)` row by row.
fn pixel_image(
    left: ImageView<'_, f32>,
    right: ImageView<'_, f32>,
    pixels: &mut Vec<f32>,
    op: fn(&[f32], &[f32], &mut [f32]),
) {
    let width = left.width();
    pixels.clear();
    pixels.resize(width * left.height(), 0.0);
    for y in 0..left.height() {
        op(
            view_row(&left, y),
            view_row(&right, y),
            &mut pixels[y * width..(y + 1) * width],
        );
    }
}

fn difference_windows(
    left: ImageView<'_, f32>,
    right: ImageView<'_, f32>,
    kernel: Vec2,
    scratch: &mut CostScratch,
    out: &mut Vec<f32>,
    op: fn(&[f32], &[f32], &mut [f32]),
) {
    let (kw, kh) = kernel_dims(kernel);
    pixel_image(left, right, &mut scratch.pixels, op);
    window_sums(
        &scratch.pixels,
        left.width(),
        left.height(),
        kw,
        kh,
        &mut scratch.horiz,
        out,
    );
}

fn patch_sum(
    left: ImageView<'_, f32>,
    right: ImageView<'_, f32>,
    term: impl Fn(f32, f32) -> f32,
) -> f32 {
    let mut acc = 0.0f32;
    for y in 0..left.height() {
        for (&l, &r) in view_row(&left, y).iter().zip(view_row(&right, y)) {
            acc += term(l, r);
        }
    }
    acc
}

impl CostFunction for AbsoluteCost {
    type Plan = ();

    fn plan(&self, _left: ImageView<'_, f32>, _kernel: Vec2) -> Self::Plan {}

    fn score_windows(
        &self,
        _plan: &Self::Plan,
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        kernel: Vec2,
        scratch: &mut CostScratch,
        out: &mut Vec<f32>,
    ) {
        difference_windows(left, right, kernel, scratch, out, rows::abs_diff_row);
    }

    fn score(&self, left: ImageView<'_, f32>, right: ImageView<'_, f32>) -> f32 {
        patch_sum(left, right, |l, r| (l - r).abs())
    }

    fn is_better(&self, candidate: f32, incumbent: f32) -> bool {
        candidate < incumbent
    }
}

impl CostFunction for SquaredCost {
    type Plan = ();

    fn plan(&self, _left: ImageView<'_, f32>, _kernel: Vec2) -> Self::Plan {}

    fn score_windows(
        &self,
        _plan: &Self::Plan,
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        kernel: Vec2,
        scratch: &mut CostScratch,
        out: &mut Vec<f32>,
    ) {
        difference_windows(left, right, kernel, scratch, out, rows::sq_diff_row);
    }

    fn score(&self, left: ImageView<'_, f32>, right: ImageView<'_, f32>) -> f32 {
        patch_sum(left, right, |l, r| (l - r) * (l - r))
    }

    fn is_better(&self, candidate: f32, incumbent: f32) -> bool {
        candidate < incumbent
    }
}

fn is_flat(variance: f32, sum_sq: f32) -> bool {
    variance <= NCC_FLAT_VARIANCE * sum_sq.max(1.0)
}

fn ncc_from_sums(n: f32, sum_l: f32, sum_l2: f32, sum_r: f32, sum_r2: f32, sum_lr: f32) -> f32 {
    let var_l = sum_l2 - sum_l * sum_l / n;
    let var_r = sum_r2 - sum_r * sum_r / n;
    if is_flat(var_l, sum_l2) || is_flat(var_r, sum_r2) {
        return f32::NAN;
    }
    let cov = sum_lr - sum_l * sum_r / n;
    cov / (var_l * var_r).sqrt()
}

impl CostFunction for NccCost {
    type Plan = NccPlan;

    fn plan(&self, left: ImageView<'_, f32>, kernel: Vec2) -> Self::Plan {
        let (kw, kh) = kernel_dims(kernel);
        let mut scratch = CostScratch::default();
        let mut sum_l = Vec::new();
        let mut sum_l2 = Vec::new();
        pixel_image(left, left, &mut scratch.pixels, rows::copy_row);
        window_sums(
            &scratch.pixels,
            left.width(),
            left.height(),
            kw,
            kh,
            &mut scratch.horiz,
            &mut sum_l,
        );
        pixel_image(left, left, &mut scratch.pixels, rows::mul_row);
        window_sums(
            &scratch.pixels,
            left.width(),
            left.height(),
            kw,
            kh,
            &mut scratch.horiz,
            &mut sum_l2,
        );
        NccPlan { sum_l, sum_l2 }
    }

    fn score_windows(
        &self,
        plan: &Self::Plan,
        left: ImageView<'_, f32>,
        right: ImageView<'_, f32>,
        kernel: Vec2,
        scratch: &mut CostScratch,
        out: &mut Vec<f32>,
    ) {
        let (kw, kh) = kernel_dims(kernel);
        let (width, height) = (left.width(), left.height());
        let CostScratch {
            pixels,
            horiz,
            sum_r,
            sum_r2,
            sum_lr,
        } = scratch;

        pixel_image(right, right, pixels, rows::copy_row);
        window_sums(pixels, width, height, kw, kh, horiz, sum_r);
        pixel_image(right, right, pixels, rows::mul_row);
        window_sums(pixels, width, height, kw, kh, horiz, sum_r2);
        pixel_image(left, right, pixels, rows::mul_row);
        window_sums(pixels, width, height, kw, kh, horiz, sum_lr);

        let n = (kw * kh) as f32;
        out.clear();
        out.extend((0..sum_lr.len()).map(|i| {
            ncc_from_sums(
                n,
                plan.sum_l[i],
                plan.sum_l2[i],
                sum_r[i],
                sum_r2[i],
                sum_lr[i],
            )
        }));
    }

    fn score(&self, left: ImageView<'_, f32>, right: ImageView<'_, f32>) -> f32 {
        let n = (left.width() * left.height()) as f32;
        ncc_from_sums(
            n,
            patch_sum(left, right, |l, _| l),
            patch_sum(left, right, |l, _| l * l),
            patch_sum(left, right, |_, r| r),
            patch_sum(left, right, |_, r| r * r),
            patch_sum(left, right, |l, r| l * r),
        )
    }

    fn is_better(&self, candidate: f32, incumbent: f32) -> bool {
        candidate > incumbent
    }
}

#[cfg(test)]
mod tests {
    use super::{AbsoluteCost, CostFunction, CostScratch, NccCost, SquaredCost};
    use crate::geom::Vec2;
    use crate::image::ImageView;

    fn patch(width: usize, height: usize, seed: usize) -> Vec<f32> {
        (0..width * height)
            .map(|i| (((i + seed) * 37 + (i * i) % 13) % 97) as f32)
            .collect()
    }

    fn check_windows_match_direct<C: CostFunction>(cost: &C) {
        let (w, h) = (9, 7);
        let kernel = Vec2::new(3, 5);
        let left_data = patch(w, h, 1);
        let right_data = patch(w, h, 5);
        let left = ImageView::from_slice(&left_data, w, h).unwrap();
        let right = ImageView::from_slice(&right_data, w, h).unwrap();

        let plan = cost.plan(left, kernel);
        let mut scratch = CostScratch::default();
        let mut out = Vec::new();
        cost.score_windows(&plan, left, right, kernel, &mut scratch, &mut out);

        let (ow, oh) = (w - 2, h - 4);
        assert_eq!(out.len(), ow * oh);
        for y in 0..oh {
            for x in 0..ow {
                let l = left.roi(x, y, 3, 5).unwrap();
                let r = right.roi(x, y, 3, 5).unwrap();
                let direct = cost.score(l, r);
                let windowed = out[y * ow + x];
                let tol = 1e-4 * direct.abs().max(1.0);
                assert!(
                    (direct - windowed).abs() <= tol,
                    "({x}, {y}): {direct} vs {windowed}"
                );
            }
        }
    }

    #[test]
    fn absolute_windows_match_direct_scores() {
        check_windows_match_direct(&AbsoluteCost);
    }

    #[test]
    fn squared_windows_match_direct_scores() {
        check_windows_match_direct(&SquaredCost);
    }

    #[test]
    fn ncc_windows_match_direct_scores() {
        check_windows_match_direct(&NccCost);
    }

    #[test]
    fn ncc_is_one_for_affine_copies_and_nan_for_flat() {
        let left: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let right: Vec<f32> = left.iter().map(|v| 2.0 * v + 10.0).collect();
        let flat = vec![5.0f32; 16];
        let l = ImageView::from_slice(&left, 4, 4).unwrap();
        let r = ImageView::from_slice(&right, 4, 4).unwrap();
        let f = ImageView::from_slice(&flat, 4, 4).unwrap();
        assert!((NccCost.score(l, r) - 1.0).abs() < 1e-5);
        assert!(NccCost.score(f, r).is_nan());
        assert!(NccCost.score(l, f).is_nan());
    }

    #[test]
    fn preference_direction_follows_metric() {
        assert!(AbsoluteCost.is_better(1.0, 2.0));
        assert!(SquaredCost.is_better(0.0, 0.5));
        assert!(NccCost.is_better(0.9, 0.1));
        assert!(!NccCost.is_better(0.1, 0.1));
    }
}
