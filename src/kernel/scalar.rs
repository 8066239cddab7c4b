//! Scalar row operations and the sequential block matcher.

use crate::cost::{CostFunction, CostScratch};
use crate::disparity::DisparityMap;
use crate::image::ImageView;
use crate::kernel::{BestMatches, SearchLayout, SearchParams};
use crate::util::StereoCorrResult;

#[inline]
pub(crate) fn copy_row(a: &[f32], _b: &[f32], out: &mut [f32]) {
    let n = out.len().min(a.len());
    out[..n].copy_from_slice(&a[..n]);
}

#[inline]
pub(crate) fn abs_diff_row(a: &[f32], b: &[f32], out: &mut [f32]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = (x - y).abs();
    }
}

#[inline]
pub(crate) fn sq_diff_row(a: &[f32], b: &[f32], out: &mut [f32]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        let d = x - y;
        *o = d * d;
    }
}

#[inline]
pub(crate) fn mul_row(a: &[f32], b: &[f32], out: &mut [f32]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x * y;
    }
}

/// Scans every displacement in order on the calling thread.
pub fn best_of_search_seq<C: CostFunction>(
    cost: &C,
    left: ImageView<'_, f32>,
    right: ImageView<'_, f32>,
    params: SearchParams,
) -> StereoCorrResult<DisparityMap> {
    let layout = SearchLayout::new(left, right, params)?;
    let plan = cost.plan(left, params.kernel);
    let mut best = BestMatches::new(layout.out_len());
    let mut scratch = CostScratch::default();
    let mut scores = Vec::with_capacity(layout.out_len());

    for index in 0..layout.candidates() {
        let shifted = layout.shifted(left, right, index)?;
        cost.score_windows(&plan, left, shifted, params.kernel, &mut scratch, &mut scores);
        best.update(cost, index, &scores);
    }
    best.into_map(&layout)
}
