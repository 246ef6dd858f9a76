//! The macro loop nest flattened into a linear tile index space.
//!
//! Levels are stored outermost first. The last one or two levels are the
//! kernel axes (tiled); every other level steps one element at a time. A
//! flat tile index is the mixed-radix number formed by the per-level tile
//! positions, innermost level fastest, so contiguous index ranges map to
//! contiguous runs of the loop nest.

use std::ops::Range;

use smallvec::SmallVec;

/// Stack-allocated Vec for per-level positions.
type SVec<T> = SmallVec<[T; 8]>;

/// One level of the macro loop nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLevel {
    pub extent: usize,
    pub tile: usize,
    pub stride_a: isize,
    pub stride_b: isize,
}

impl GridLevel {
    /// Number of tiles along this level.
    pub fn count(&self) -> usize {
        self.extent.div_ceil(self.tile)
    }

    fn step_a(&self) -> isize {
        self.tile as isize * self.stride_a
    }

    fn step_b(&self) -> isize {
        self.tile as isize * self.stride_b
    }

    /// Extent of the tile at position `pos` (the last tile may be ragged).
    fn tile_extent(&self, pos: usize) -> usize {
        self.tile.min(self.extent - pos * self.tile)
    }
}

/// One unit of work handed to a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Element offset of the tile origin in A.
    pub offset_a: isize,
    /// Element offset of the tile origin in B.
    pub offset_b: isize,
    /// Extent along the innermost kernel axis.
    pub extent_a: usize,
    /// Extent along the second kernel axis (1 for linear tiles).
    pub extent_b: usize,
}

/// Flattened tile index space of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    levels: Vec<GridLevel>,
    kernel_levels: usize,
}

impl TileGrid {
    /// `levels` outermost first; the last `kernel_levels` (0, 1 or 2) are the
    /// kernel axes, innermost last.
    pub fn new(levels: Vec<GridLevel>, kernel_levels: usize) -> Self {
        debug_assert!(kernel_levels <= 2 && kernel_levels <= levels.len());
        Self {
            levels,
            kernel_levels,
        }
    }

    pub fn levels(&self) -> &[GridLevel] {
        &self.levels
    }

    /// Total number of tiles (1 for a scalar grid).
    pub fn num_tiles(&self) -> usize {
        self.levels.iter().map(GridLevel::count).product()
    }

    /// Iterate the tiles with flat indices in `range`.
    pub fn tiles(&self, range: Range<usize>) -> TileCursor<'_> {
        TileCursor::new(self, range)
    }
}

/// Odometer over a range of flat tile indices.
///
/// Decodes the start index once, then advances incrementally.
pub struct TileCursor<'a> {
    grid: &'a TileGrid,
    pos: SVec<usize>,
    offset_a: isize,
    offset_b: isize,
    remaining: usize,
}

impl<'a> TileCursor<'a> {
    fn new(grid: &'a TileGrid, range: Range<usize>) -> Self {
        let mut pos: SVec<usize> = SmallVec::from_elem(0, grid.levels.len());
        let mut offset_a = 0isize;
        let mut offset_b = 0isize;
        let mut rem = range.start;
        for (p, level) in pos.iter_mut().zip(&grid.levels).rev() {
            let count = level.count();
            *p = rem % count;
            rem /= count;
            offset_a += *p as isize * level.step_a();
            offset_b += *p as isize * level.step_b();
        }
        Self {
            grid,
            pos,
            offset_a,
            offset_b,
            remaining: range.len(),
        }
    }

    fn current(&self) -> Tile {
        let levels = &self.grid.levels;
        let n = levels.len();
        let extent = |l: usize| levels[l].tile_extent(self.pos[l]);
        let (extent_a, extent_b) = match self.grid.kernel_levels {
            0 => (1, 1),
            1 => (extent(n - 1), 1),
            _ => (extent(n - 1), extent(n - 2)),
        };
        Tile {
            offset_a: self.offset_a,
            offset_b: self.offset_b,
            extent_a,
            extent_b,
        }
    }

    fn advance(&mut self) {
        for (p, level) in self.pos.iter_mut().zip(&self.grid.levels).rev() {
            *p += 1;
            self.offset_a += level.step_a();
            self.offset_b += level.step_b();
            if *p < level.count() {
                return;
            }
            self.offset_a -= *p as isize * level.step_a();
            self.offset_b -= *p as isize * level.step_b();
            *p = 0;
        }
    }
}

impl Iterator for TileCursor<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.remaining == 0 {
            return None;
        }
        let tile = self.current();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for TileCursor<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(extent: usize, tile: usize, stride_a: isize, stride_b: isize) -> GridLevel {
        GridLevel {
            extent,
            tile,
            stride_a,
            stride_b,
        }
    }

    fn transpose_grid() -> TileGrid {
        // outer axis of 3, then dim_b (extent 10, tile 4), then dim_a (extent 6, tile 4)
        TileGrid::new(
            vec![
                level(3, 1, 60, 60),
                level(10, 4, 6, 1),
                level(6, 4, 1, 10),
            ],
            2,
        )
    }

    #[test]
    fn test_num_tiles() {
        assert_eq!(transpose_grid().num_tiles(), 3 * 3 * 2);
        assert_eq!(TileGrid::new(vec![], 0).num_tiles(), 1);
    }

    #[test]
    fn test_scalar_grid() {
        let grid = TileGrid::new(vec![], 0);
        let tiles: Vec<Tile> = grid.tiles(0..1).collect();
        assert_eq!(
            tiles,
            vec![Tile {
                offset_a: 0,
                offset_b: 0,
                extent_a: 1,
                extent_b: 1
            }]
        );
    }

    #[test]
    fn test_tiles_cover_index_space_once() {
        let grid = transpose_grid();
        let mut hits = vec![0u32; 180];
        for tile in grid.tiles(0..grid.num_tiles()) {
            for j in 0..tile.extent_b as isize {
                for i in 0..tile.extent_a as isize {
                    hits[(tile.offset_b + j + i * 10) as usize] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn test_ragged_edges() {
        let grid = transpose_grid();
        let tiles: Vec<Tile> = grid.tiles(0..6).collect();
        // first outer slice: dim_b positions 0..3, dim_a positions 0..2
        assert_eq!((tiles[0].extent_a, tiles[0].extent_b), (4, 4));
        assert_eq!((tiles[1].extent_a, tiles[1].extent_b), (2, 4));
        assert_eq!((tiles[5].extent_a, tiles[5].extent_b), (2, 2));
        assert_eq!(tiles[1].offset_a, 4);
        assert_eq!(tiles[1].offset_b, 40);
        assert_eq!(tiles[2].offset_a, 24);
        assert_eq!(tiles[2].offset_b, 4);
    }

    #[test]
    fn test_subrange_matches_full_iteration() {
        let grid = transpose_grid();
        let all: Vec<Tile> = grid.tiles(0..grid.num_tiles()).collect();
        let tail: Vec<Tile> = grid.tiles(7..13).collect();
        assert_eq!(tail, all[7..13].to_vec());
        assert_eq!(grid.tiles(5..5).count(), 0);
    }

    #[test]
    fn test_linear_grid() {
        let grid = TileGrid::new(vec![level(2, 1, 100, 7), level(10, 4, 1, 1)], 1);
        let tiles: Vec<Tile> = grid.tiles(0..grid.num_tiles()).collect();
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[2].extent_a, 2);
        assert_eq!(tiles[2].extent_b, 1);
        assert_eq!(tiles[3].offset_a, 100);
        assert_eq!(tiles[3].offset_b, 7);
    }
}
