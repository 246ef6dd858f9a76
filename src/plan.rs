//! Transposition plans: analysis once, execution many times.
//!
//! Plan construction validates both layouts and the permutation, builds the
//! permuted index space, canonicalizes it (drop → sort → fuse), picks the
//! execution mode and loop order, sizes the tiles and partitions the tile
//! grid across threads. Execution only decodes tiles and calls kernels.

use std::marker::PhantomData;
use std::ops::Range;

use transpose_traits::{Conj, Element, ElementOp, Identity};

use crate::analyze::{analyze, ExecMode};
use crate::block::{tile_sizes, BlockingParams};
use crate::fuse::{canonicalize, Axis};
use crate::kernel::macro_kernel::{linear, rescale_tile, strided_tile, transpose_tile};
use crate::kernel::{KernelStrides, Update};
use crate::layout::{MajorOrder, TensorLayout};
use crate::permutation::Permutation;
use crate::simd;
use crate::threading::{partition, run_ranges, SendPtr, MINTHREADLENGTH};
#[cfg(feature = "parallel")]
use crate::threading::WorkerPool;
use crate::tile::{GridLevel, TileGrid};
use crate::{Result, TransposeError, DEFAULT_TILE_WORKING_SET};

/// Tunables for plan construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Requested worker count; 0 and 1 both mean serial.
    pub num_threads: usize,
    /// How sizes and outer sizes are interpreted.
    pub major_order: MajorOrder,
    /// Apply complex conjugation to every element of A.
    pub conjugate: bool,
    /// Bytes for one A tile plus one B tile.
    pub tile_working_set: usize,
    /// Tensors with fewer elements always run on the caller's thread.
    pub min_parallel_len: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            num_threads: 1,
            major_order: MajorOrder::ColumnMajor,
            conjugate: false,
            tile_working_set: DEFAULT_TILE_WORKING_SET,
            min_parallel_len: MINTHREADLENGTH,
        }
    }
}

/// A reusable plan for `B[π(i)] = α·f(A[i]) + β·B[π(i)]`.
///
/// The plan holds shape metadata only; data buffers and scalars are supplied
/// per execution, so one plan can be replayed on many buffers (and from many
/// threads at once, as long as the destinations differ).
///
/// # Example
///
/// ```
/// use strided_transpose::{MajorOrder, TransposePlan};
///
/// // 2×3 column-major matrix → its 3×2 transpose
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let mut b = [0.0; 6];
/// let plan = TransposePlan::<f64>::new(&[1, 0], &[2, 3], None, None, 1, MajorOrder::ColumnMajor)
///     .unwrap();
/// plan.execute(1.0, &a, 0.0, &mut b).unwrap();
/// assert_eq!(b, [1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
/// ```
#[derive(Debug, Clone)]
pub struct TransposePlan<T> {
    perm: Permutation,
    layout_a: TensorLayout,
    layout_b: TensorLayout,
    /// Canonical axes after drop/sort/fuse.
    axes: Vec<Axis>,
    mode: ExecMode,
    loop_order: Vec<usize>,
    tile_sizes: Vec<usize>,
    grid: TileGrid,
    kernel: KernelStrides,
    /// Elements covered by one full tile.
    tile_len: usize,
    contiguous_run: usize,
    ranges: Vec<Range<usize>>,
    num_threads: usize,
    conjugate: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Element> TransposePlan<T> {
    /// Build a plan with default tunables.
    ///
    /// `perm[i]` names the axis of A that becomes axis `i` of B. `None` outer
    /// sizes mean the tensor fills its buffer exactly; for B the logical
    /// sizes are the permuted sizes of A.
    pub fn new(
        perm: &[usize],
        size_a: &[usize],
        outer_a: Option<&[usize]>,
        outer_b: Option<&[usize]>,
        num_threads: usize,
        order: MajorOrder,
    ) -> Result<Self> {
        let options = PlanOptions {
            num_threads,
            major_order: order,
            ..PlanOptions::default()
        };
        Self::with_options(perm, size_a, outer_a, outer_b, &options)
    }

    /// Build a plan with explicit tunables.
    pub fn with_options(
        perm: &[usize],
        size_a: &[usize],
        outer_a: Option<&[usize]>,
        outer_b: Option<&[usize]>,
        options: &PlanOptions,
    ) -> Result<Self> {
        let order = options.major_order;
        let layout_a = TensorLayout::new(size_a, outer_a, order)?;
        let perm = Permutation::new(perm)?;
        if perm.dim() != layout_a.dim() {
            return Err(TransposeError::InvalidPermutation(format!(
                "permutation of length {} for a tensor of dimension {}",
                perm.dim(),
                layout_a.dim()
            )));
        }
        let size_b = perm.apply(size_a);
        let layout_b = TensorLayout::new(&size_b, outer_b, order)?;

        let permuted: Vec<Axis> = perm
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &p)| Axis::new(size_b[i], layout_a.strides()[p], layout_b.strides()[i]))
            .collect();
        let (axes, contiguous_run) = canonicalize(&permuted);
        let analysis = analyze(&axes);
        let mode = analysis.mode;

        let params = BlockingParams {
            working_set: options.tile_working_set,
            micro: T::MICRO,
            elem_size: std::mem::size_of::<T>(),
        };
        let tiles = tile_sizes(&axes, mode, &params);

        let (grid, kernel) = build_grid(&axes, mode, &analysis.loop_order, &tiles);
        let tile_len = mode.kernel_axes().iter().map(|&d| tiles[d]).product();

        let parts = if options.num_threads <= 1 || layout_b.len() < options.min_parallel_len {
            1
        } else {
            options.num_threads
        };
        let ranges = partition(grid.num_tiles(), parts);

        log::debug!(
            "transpose plan: perm={:?} size_a={:?} canonical={:?} mode={:?} loop_order={:?} \
             tiles={:?} num_tiles={} ranges={}",
            perm.as_slice(),
            size_a,
            axes,
            mode,
            analysis.loop_order,
            tiles,
            grid.num_tiles(),
            ranges.len()
        );

        Ok(Self {
            perm,
            layout_a,
            layout_b,
            axes,
            mode,
            loop_order: analysis.loop_order,
            tile_sizes: tiles,
            grid,
            kernel,
            tile_len,
            contiguous_run,
            ranges,
            num_threads: options.num_threads,
            conjugate: options.conjugate,
            _marker: PhantomData,
        })
    }

    /// Run the plan on `a` and `b`.
    ///
    /// When `alpha` is zero A is never read and `a` may be empty. When `beta`
    /// is zero B is never read, so it may hold anything (including NaN).
    pub fn execute(&self, alpha: T, a: &[T], beta: T, b: &mut [T]) -> Result<()> {
        self.check_buffers(alpha, a, b)?;
        #[cfg(feature = "parallel")]
        unsafe {
            self.run(alpha, a.as_ptr(), beta, b.as_mut_ptr(), None)
        };
        #[cfg(not(feature = "parallel"))]
        unsafe {
            self.run(alpha, a.as_ptr(), beta, b.as_mut_ptr())
        };
        Ok(())
    }

    /// Same as [`execute`](Self::execute), with the workers on `pool`.
    #[cfg(feature = "parallel")]
    pub fn execute_in(&self, pool: &WorkerPool, alpha: T, a: &[T], beta: T, b: &mut [T]) -> Result<()> {
        self.check_buffers(alpha, a, b)?;
        unsafe { self.run(alpha, a.as_ptr(), beta, b.as_mut_ptr(), Some(pool)) };
        Ok(())
    }

    /// Run the plan on raw pointers without any validation.
    ///
    /// # Safety
    /// - `b` must be valid for reads and writes of [`TensorLayout::required_len`]
    ///   elements of [`layout_b`](Self::layout_b)
    /// - unless `alpha` is zero, `a` must be valid for reads of the required
    ///   length of [`layout_a`](Self::layout_a)
    /// - the two regions must not overlap and no other thread may access the
    ///   written elements of `b` during the call
    pub unsafe fn execute_raw(&self, alpha: T, a: *const T, beta: T, b: *mut T) {
        #[cfg(feature = "parallel")]
        self.run(alpha, a, beta, b, None);
        #[cfg(not(feature = "parallel"))]
        self.run(alpha, a, beta, b);
    }

    fn check_buffers(&self, alpha: T, a: &[T], b: &[T]) -> Result<()> {
        let required_b = self.layout_b.required_len();
        if b.len() < required_b {
            return Err(TransposeError::BufferTooSmall {
                which: "B",
                required: required_b,
                actual: b.len(),
            });
        }
        if !alpha.is_zero() {
            let required_a = self.layout_a.required_len();
            if a.len() < required_a {
                return Err(TransposeError::BufferTooSmall {
                    which: "A",
                    required: required_a,
                    actual: a.len(),
                });
            }
        }
        Ok(())
    }

    unsafe fn run(
        &self,
        alpha: T,
        a: *const T,
        beta: T,
        b: *mut T,
        #[cfg(feature = "parallel")] pool: Option<&WorkerPool>,
    ) {
        let update = Update::new(alpha, beta);
        if matches!(update, Update::Keep) {
            log::trace!("transpose: alpha = 0, beta = 1, nothing to do");
            return;
        }
        log::trace!(
            "transpose: update={:?} conjugate={} workers={}",
            update,
            self.conjugate,
            self.ranges.len()
        );

        let src = SendPtr::from_const(a);
        let dst = SendPtr(b);
        let worker = move |range: Range<usize>| {
            let len = range.len() * self.tile_len;
            simd::dispatch_if_large(len, || {
                if self.conjugate {
                    self.run_tiles::<Conj>(range, src.as_const(), dst.as_ptr(), update)
                } else {
                    self.run_tiles::<Identity>(range, src.as_const(), dst.as_ptr(), update)
                }
            })
        };

        #[cfg(feature = "parallel")]
        run_ranges(&self.ranges, pool, &worker);
        #[cfg(not(feature = "parallel"))]
        run_ranges(&self.ranges, &worker);
    }

    /// Execute the tiles with flat indices in `range`.
    ///
    /// Never computes an A address when the update does not read A, so a
    /// dangling `src` is fine in that case.
    #[inline(always)]
    fn run_tiles<Op: ElementOp<T>>(
        &self,
        range: Range<usize>,
        src: *const T,
        dst: *mut T,
        update: Update<T>,
    ) {
        let k = self.kernel;
        let reads_a = update.reads_a();
        for tile in self.grid.tiles(range) {
            let d = dst.wrapping_offset(tile.offset_b);
            // SAFETY: tiles stay inside the layouts validated at build time and
            // distinct ranges never share a destination element.
            unsafe {
                if !reads_a {
                    rescale_tile(d, k.dst_a, k.dst_b, tile.extent_a, tile.extent_b, update);
                    continue;
                }
                let s = src.wrapping_offset(tile.offset_a);
                match self.mode {
                    ExecMode::Scalar | ExecMode::Linear { .. } => {
                        linear::<T, Op>(s, k.src_a, d, k.dst_a, tile.extent_a, update)
                    }
                    ExecMode::Transpose { .. } if k.is_unit_transpose() => transpose_tile::<T, Op>(
                        s,
                        k.src_b,
                        tile.extent_a,
                        d,
                        k.dst_a,
                        tile.extent_b,
                        update,
                    ),
                    ExecMode::Transpose { .. } => {
                        strided_tile::<T, Op>(s, d, &k, tile.extent_a, tile.extent_b, update)
                    }
                }
            }
        }
    }
}

impl<T> TransposePlan<T> {
    pub fn perm(&self) -> &Permutation {
        &self.perm
    }

    pub fn layout_a(&self) -> &TensorLayout {
        &self.layout_a
    }

    pub fn layout_b(&self) -> &TensorLayout {
        &self.layout_b
    }

    /// Canonical (dropped, sorted, fused) axes the loop nest runs over.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Macro loop axes, outermost first (indices into [`axes`](Self::axes)).
    pub fn loop_order(&self) -> &[usize] {
        &self.loop_order
    }

    /// Tile size per canonical axis.
    pub fn tile_sizes(&self) -> &[usize] {
        &self.tile_sizes
    }

    pub fn num_tiles(&self) -> usize {
        self.grid.num_tiles()
    }

    /// Tile index range of every worker.
    pub fn partition(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Number of leading output-order axes contiguous in both tensors.
    pub fn contiguous_run(&self) -> usize {
        self.contiguous_run
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn is_conjugate(&self) -> bool {
        self.conjugate
    }
}

/// Lay out the loop nest as a tile grid and pick the kernel strides.
///
/// Grid levels are the macro loop axes followed by the kernel axes; in
/// transpose mode `dim_a` is innermost so a tile's `extent_a` runs along it.
fn build_grid(
    axes: &[Axis],
    mode: ExecMode,
    loop_order: &[usize],
    tiles: &[usize],
) -> (TileGrid, KernelStrides) {
    let level = |d: usize| GridLevel {
        extent: axes[d].extent,
        tile: tiles[d],
        stride_a: axes[d].stride_a,
        stride_b: axes[d].stride_b,
    };
    let mut levels: Vec<GridLevel> = loop_order.iter().map(|&d| level(d)).collect();
    let kernel = match mode {
        ExecMode::Scalar => KernelStrides::default(),
        ExecMode::Linear { inner } => {
            levels.push(level(inner));
            KernelStrides {
                src_a: axes[inner].stride_a,
                src_b: 0,
                dst_a: axes[inner].stride_b,
                dst_b: 0,
            }
        }
        ExecMode::Transpose { dim_a, dim_b } => {
            levels.push(level(dim_b));
            levels.push(level(dim_a));
            KernelStrides {
                src_a: axes[dim_a].stride_a,
                src_b: axes[dim_b].stride_a,
                dst_a: axes[dim_a].stride_b,
                dst_b: axes[dim_b].stride_b,
            }
        }
    };
    let kernel_levels = mode.kernel_axes().len();
    (TileGrid::new(levels, kernel_levels), kernel)
}
