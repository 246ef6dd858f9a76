//! Macro-kernels: process one tile, dispatching full sub-tiles to the
//! micro-kernel and handling edges with scalar loops.
//!
//! Axis `a` is the axis that is unit-stride in the source (A), axis `b` the
//! one that is unit-stride in the destination (B). A tile covers
//! `extent_a × extent_b` elements.

use super::micro::{MicroKernel, ScalarKernel};
use super::update::Update;
use transpose_traits::{Element, ElementOp};

/// Strides of both tensors along the two kernel axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelStrides {
    /// A stride along axis `a`.
    pub src_a: isize,
    /// A stride along axis `b`.
    pub src_b: isize,
    /// B stride along axis `a`.
    pub dst_a: isize,
    /// B stride along axis `b`.
    pub dst_b: isize,
}

impl KernelStrides {
    /// Unit stride on the source along `a` and on the destination along `b`,
    /// the layout the micro-kernel grid requires.
    pub fn is_unit_transpose(&self) -> bool {
        self.src_a == 1 && self.dst_b == 1
    }
}

/// Transpose an `extent_a × extent_b` tile: `B[j + i*ldb] <- A[i + j*lda]`.
///
/// Full MICRO × MICRO sub-tiles go to the micro-kernel; right and bottom
/// edges use scalar loops.
///
/// # Safety
/// `src`/`dst` must be valid for the given extents and strides, and `update`
/// must read A.
#[inline]
pub unsafe fn transpose_tile<T: Element, Op: ElementOp<T>>(
    src: *const T,
    lda: isize,
    extent_a: usize,
    dst: *mut T,
    ldb: isize,
    extent_b: usize,
    update: Update<T>,
) {
    let micro = <ScalarKernel as MicroKernel<T>>::MICRO;

    let full_a = extent_a / micro;
    let rem_a = extent_a % micro;
    let full_b = extent_b / micro;
    let rem_b = extent_b % micro;
    let m = micro as isize;

    for jb in 0..full_b {
        let j = (jb * micro) as isize;
        for ia in 0..full_a {
            let i = (ia * micro) as isize;
            <ScalarKernel as MicroKernel<T>>::transpose_micro::<Op>(
                src.offset(i + j * lda),
                lda,
                dst.offset(j + i * ldb),
                ldb,
                update,
            );
        }
        // right edge along a
        if rem_a > 0 {
            let i = (full_a * micro) as isize;
            edge::<T, Op>(src, lda, dst, ldb, i, rem_a as isize, j, m, update);
        }
    }

    // bottom edge along b, including the corner
    if rem_b > 0 {
        let j = (full_b * micro) as isize;
        edge::<T, Op>(src, lda, dst, ldb, 0, extent_a as isize, j, rem_b as isize, update);
    }
}

#[inline(always)]
#[allow(clippy::too_many_arguments)]
unsafe fn edge<T: Element, Op: ElementOp<T>>(
    src: *const T,
    lda: isize,
    dst: *mut T,
    ldb: isize,
    i0: isize,
    ni: isize,
    j0: isize,
    nj: isize,
    update: Update<T>,
) {
    for jj in j0..j0 + nj {
        for ii in i0..i0 + ni {
            update.store::<Op>(src.offset(ii + jj * lda), dst.offset(jj + ii * ldb));
        }
    }
}

/// Tile with arbitrary strides on both sides (element-wise gather/scatter).
///
/// Used when the kernel axes are not unit-stride, e.g. a sub-tensor whose
/// unit-stride axis has extent 1.
///
/// # Safety
/// Same requirements as [`transpose_tile`].
#[inline]
pub unsafe fn strided_tile<T: Element, Op: ElementOp<T>>(
    src: *const T,
    dst: *mut T,
    strides: &KernelStrides,
    extent_a: usize,
    extent_b: usize,
    update: Update<T>,
) {
    let mut s_col = src;
    let mut d_col = dst;
    for _ in 0..extent_b {
        let mut s = s_col;
        let mut d = d_col;
        for _ in 0..extent_a {
            update.store::<Op>(s, d);
            s = s.offset(strides.src_a);
            d = d.offset(strides.dst_a);
        }
        s_col = s_col.offset(strides.src_b);
        d_col = d_col.offset(strides.dst_b);
    }
}

/// Linear run of `count` elements along an axis shared by A and B.
///
/// Contiguous on both sides → slice loop (or `memcpy` for a plain copy);
/// otherwise an element-wise strided loop.
///
/// # Safety
/// `src` must be readable at `count` positions of stride `src_stride`, `dst`
/// writable at `count` positions of stride `dst_stride`, the two must not
/// overlap, and `update` must read A.
#[inline]
pub unsafe fn linear<T: Element, Op: ElementOp<T>>(
    src: *const T,
    src_stride: isize,
    dst: *mut T,
    dst_stride: isize,
    count: usize,
    update: Update<T>,
) {
    if src_stride == 1 && dst_stride == 1 {
        if update.is_copy::<Op>() {
            std::ptr::copy_nonoverlapping(src, dst, count);
            return;
        }
        let s = std::slice::from_raw_parts(src, count);
        let d = std::slice::from_raw_parts_mut(dst, count);
        for (d, s) in d.iter_mut().zip(s) {
            update.store::<Op>(s, d);
        }
    } else {
        let mut s = src;
        let mut d = dst;
        for _ in 0..count {
            update.store::<Op>(s, d);
            s = s.offset(src_stride);
            d = d.offset(dst_stride);
        }
    }
}

/// Rescale (or zero) a destination tile without touching the source.
///
/// # Safety
/// `dst` must be valid for the given extents and strides.
#[inline]
pub unsafe fn rescale_tile<T: Element>(
    dst: *mut T,
    dst_a: isize,
    dst_b: isize,
    extent_a: usize,
    extent_b: usize,
    update: Update<T>,
) {
    let mut d_col = dst;
    for _ in 0..extent_b {
        let mut d = d_col;
        for _ in 0..extent_a {
            update.rescale(d);
            d = d.offset(dst_a);
        }
        d_col = d_col.offset(dst_b);
    }
}
