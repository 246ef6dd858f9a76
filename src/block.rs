//! Tile size selection.
//!
//! A tile of A and the matching tile of B must fit in the working-set target
//! together. Kernel axes are tiled in multiples of the micro-kernel width;
//! axes narrower than one micro-tile are left whole.

use crate::analyze::ExecMode;
use crate::fuse::Axis;

/// Byte budget and vector width used to pick tile sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingParams {
    /// Bytes available for one A tile plus one B tile.
    pub working_set: usize,
    /// Micro-kernel width in elements.
    pub micro: usize,
    /// Element size in bytes.
    pub elem_size: usize,
}

impl BlockingParams {
    fn fits(&self, elems_per_side: usize) -> bool {
        2 * elems_per_side * self.elem_size <= self.working_set
    }
}

/// Tile size for every canonical axis (1 for macro-loop axes).
pub fn tile_sizes(axes: &[Axis], mode: ExecMode, params: &BlockingParams) -> Vec<usize> {
    let mut tiles = vec![1usize; axes.len()];
    match mode {
        ExecMode::Scalar => {}
        ExecMode::Linear { inner } => {
            tiles[inner] = select_linear_tile(axes[inner].extent, params);
        }
        ExecMode::Transpose { dim_a, dim_b } => {
            let (ta, tb) = select_transpose_tiles(axes[dim_a].extent, axes[dim_b].extent, params);
            tiles[dim_a] = ta;
            tiles[dim_b] = tb;
        }
    }
    tiles
}

/// Tile along the single shared axis of a linear copy.
pub fn select_linear_tile(extent: usize, params: &BlockingParams) -> usize {
    let micro = params.micro.max(1);
    if extent < micro {
        return extent;
    }
    grow(micro, micro, extent.next_multiple_of(micro), |t| {
        params.fits(t.min(extent))
    })
}

/// Tiles `(along dim_a, along dim_b)` for a 2D transpose.
///
/// The largest square tile that fits is chosen first. If it reaches the
/// extent of one axis, the other axis grows into the remaining budget.
pub fn select_transpose_tiles(
    extent_a: usize,
    extent_b: usize,
    params: &BlockingParams,
) -> (usize, usize) {
    let micro = params.micro.max(1);
    let fits = |ta: usize, tb: usize| params.fits(ta.min(extent_a) * tb.min(extent_b));
    let cap_a = extent_a.next_multiple_of(micro);
    let cap_b = extent_b.next_multiple_of(micro);

    match (extent_a < micro, extent_b < micro) {
        (true, true) => (extent_a, extent_b),
        (true, false) => (extent_a, grow(micro, micro, cap_b, |t| fits(extent_a, t))),
        (false, true) => (grow(micro, micro, cap_a, |t| fits(t, extent_b)), extent_b),
        (false, false) => {
            let side = grow(micro, micro, cap_a.min(cap_b), |t| fits(t, t));
            if side == cap_a && cap_b > side {
                (side, grow(side, micro, cap_b, |t| fits(side, t)))
            } else if side == cap_b && cap_a > side {
                (grow(side, micro, cap_a, |t| fits(t, side)), side)
            } else {
                (side, side)
            }
        }
    }
}

/// Largest `start + k*step <= cap` accepted by `ok`, never below `start`.
fn grow(start: usize, step: usize, cap: usize, ok: impl Fn(usize) -> bool) -> usize {
    let mut t = start;
    while t + step <= cap && ok(t + step) {
        t += step;
    }
    t
}
