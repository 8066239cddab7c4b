//! Tiled execution: cut the output into tiles, compute each one
//! independently and assemble the full disparity map.

use crate::correlate::{DisparityTile, TiledView};
use crate::disparity::DisparityMap;
use crate::geom::{BBox, Vec2};
use crate::trace::{trace_event, trace_span};
use crate::util::{StereoCorrError, StereoCorrResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Splits a `cols x rows` image into row-major tiles of at most `tile_size`.
pub fn tile_grid(cols: usize, rows: usize, tile_size: Vec2) -> StereoCorrResult<Vec<BBox>> {
    if tile_size.x <= 0 || tile_size.y <= 0 {
        return Err(StereoCorrError::InvalidDimensions {
            width: tile_size.x.max(0) as usize,
            height: tile_size.y.max(0) as usize,
        });
    }
    let (cols, rows) = (cols as i32, rows as i32);
    let mut tiles = Vec::new();
    for y in (0..rows).step_by(tile_size.y as usize) {
        for x in (0..cols).step_by(tile_size.x as usize) {
            let max = Vec2::new((x + tile_size.x).min(cols), (y + tile_size.y).min(rows));
            tiles.push(BBox::new(Vec2::new(x, y), max));
        }
    }
    Ok(tiles)
}

/// Computes the whole of `view` tile by tile.
///
/// Tiles share nothing, so with `parallel` (and the `rayon` feature) they
/// are computed concurrently. Every tile must come back with exactly the
/// requested size.
pub fn rasterize<V: TiledView + ?Sized>(
    view: &V,
    tile_size: Vec2,
    parallel: bool,
) -> StereoCorrResult<DisparityMap> {
    let (cols, rows) = (view.cols(), view.rows());
    let _span = trace_span!("rasterize", cols = cols, rows = rows).entered();
    let tiles = tile_grid(cols, rows, tile_size)?;

    let compute = |bbox: &BBox| -> StereoCorrResult<DisparityTile> {
        let tile = view.compute_tile(*bbox)?;
        if tile.bbox != *bbox || tile.disparity.size() != bbox.size() {
            return Err(StereoCorrError::TileSizeMismatch {
                expected_width: bbox.width() as usize,
                expected_height: bbox.height() as usize,
                width: tile.disparity.width(),
                height: tile.disparity.height(),
            });
        }
        Ok(tile)
    };

    #[cfg(feature = "rayon")]
    let computed: Vec<DisparityTile> = if parallel {
        tiles.par_iter().map(compute).collect::<StereoCorrResult<_>>()?
    } else {
        tiles.iter().map(compute).collect::<StereoCorrResult<_>>()?
    };
    #[cfg(not(feature = "rayon"))]
    let computed: Vec<DisparityTile> = {
        let _ = parallel;
        tiles.iter().map(compute).collect::<StereoCorrResult<_>>()?
    };

    let mut out = DisparityMap::new_invalid(cols, rows);
    for tile in &computed {
        out.paste(tile.bbox.min, &tile.disparity)?;
    }
    trace_event!("rasterize_done", tiles = computed.len(), valid = out.valid_count());
    Ok(out)
}
