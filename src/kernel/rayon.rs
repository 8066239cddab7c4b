//! Parallel block matcher using rayon.
//!
//! Displacements are split across workers; each worker keeps its own best
//! buffer and scratch, and partial buffers are merged with the same
//! smallest-index tie-break the sequential scan uses.

use crate::cost::{CostFunction, CostScratch};
use crate::disparity::DisparityMap;
use crate::image::ImageView;
use crate::kernel::{BestMatches, SearchLayout, SearchParams};
use crate::util::StereoCorrResult;
use rayon::prelude::*;

/// Scans displacements in parallel; output equals the sequential scan.
pub fn best_of_search_par<C: CostFunction>(
    cost: &C,
    left: ImageView<'_, f32>,
    right: ImageView<'_, f32>,
    params: SearchParams,
) -> StereoCorrResult<DisparityMap> {
    let layout = SearchLayout::new(left, right, params)?;
    let plan = cost.plan(left, params.kernel);
    let len = layout.out_len();

    let best = (0..layout.candidates())
        .into_par_iter()
        .try_fold(
            || (BestMatches::new(len), CostScratch::default(), Vec::new()),
            |(mut best, mut scratch, mut scores), index| -> StereoCorrResult<_> {
                let shifted = layout.shifted(left, right, index)?;
                cost.score_windows(&plan, left, shifted, params.kernel, &mut scratch, &mut scores);
                best.update(cost, index, &scores);
                Ok((best, scratch, scores))
            },
        )
        .map(|partial| partial.map(|(best, _, _)| best))
        .try_reduce(|| BestMatches::new(len), |a, b| Ok(a.merge(b, cost)))?;

    best.into_map(&layout)
}
