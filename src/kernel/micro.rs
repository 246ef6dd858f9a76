//! Micro-kernel: an in-register sized MICRO × MICRO transpose.
//!
//! The scalar implementation is a pair of nested loops with constant trip
//! counts; LLVM unrolls and vectorizes them per element type.

use super::update::Update;
use transpose_traits::{Element, ElementOp};

/// Architecture-specific N×N transpose micro-kernel.
///
/// A micro-kernel combines a MICRO × MICRO tile:
///   `dst[j + i*ldb] <- src[i + j*lda]` for i,j in 0..MICRO
///
/// `i` runs along the axis that is unit-stride in the source, `j` along the
/// axis that is unit-stride in the destination.
pub trait MicroKernel<T: Element> {
    /// Micro-tile side length.
    const MICRO: usize;

    /// Transpose a full MICRO × MICRO tile.
    ///
    /// # Safety
    /// - `src` must be readable for MICRO unit-stride elements in each of
    ///   MICRO columns of stride `lda`
    /// - `dst` must be writable for MICRO unit-stride elements in each of
    ///   MICRO rows of stride `ldb`
    /// - `update` must read A (see [`Update::reads_a`])
    unsafe fn transpose_micro<Op: ElementOp<T>>(
        src: *const T,
        lda: isize,
        dst: *mut T,
        ldb: isize,
        update: Update<T>,
    );
}

/// Marker type for scalar (non-intrinsic) micro-kernels.
pub struct ScalarKernel;

impl<T: Element> MicroKernel<T> for ScalarKernel {
    const MICRO: usize = T::MICRO;

    #[inline(always)]
    unsafe fn transpose_micro<Op: ElementOp<T>>(
        src: *const T,
        lda: isize,
        dst: *mut T,
        ldb: isize,
        update: Update<T>,
    ) {
        let micro = <Self as MicroKernel<T>>::MICRO as isize;
        for i in 0..micro {
            for j in 0..micro {
                update.store::<Op>(src.offset(i + j * lda), dst.offset(j + i * ldb));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;
    use transpose_traits::{Conj, Identity};

    #[test]
    fn test_scalar_f64_4x4() {
        let src: Vec<f64> = (0..16).map(|i| i as f64).collect();
        let mut dst = vec![0.0f64; 16];

        unsafe {
            <ScalarKernel as MicroKernel<f64>>::transpose_micro::<Identity>(
                src.as_ptr(),
                4,
                dst.as_mut_ptr(),
                4,
                Update::new(1.0, 0.0),
            );
        }

        for j in 0..4 {
            for i in 0..4 {
                assert_eq!(dst[j + i * 4], src[i + j * 4], "mismatch at i={i}, j={j}");
            }
        }
    }

    #[test]
    fn test_scalar_f64_non_square_strides() {
        // src with lda=5, dst with ldb=6
        let mut src = vec![0.0f64; 20];
        for j in 0..4 {
            for i in 0..4 {
                src[i + j * 5] = (i * 10 + j) as f64;
            }
        }
        let mut dst = vec![-1.0f64; 24];

        unsafe {
            <ScalarKernel as MicroKernel<f64>>::transpose_micro::<Identity>(
                src.as_ptr(),
                5,
                dst.as_mut_ptr(),
                6,
                Update::new(2.0, 0.0),
            );
        }

        for j in 0..4 {
            for i in 0..4 {
                assert_eq!(dst[j + i * 6], 2.0 * src[i + j * 5], "mismatch at i={i}, j={j}");
            }
        }
        // padding between rows untouched
        assert_eq!(dst[4], -1.0);
        assert_eq!(dst[5], -1.0);
    }

    #[test]
    fn test_scalar_f32_8x8_accumulate() {
        let src: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let mut dst = vec![1.0f32; 64];

        unsafe {
            <ScalarKernel as MicroKernel<f32>>::transpose_micro::<Identity>(
                src.as_ptr(),
                8,
                dst.as_mut_ptr(),
                8,
                Update::new(1.0, 3.0),
            );
        }

        for j in 0..8 {
            for i in 0..8 {
                assert_eq!(dst[j + i * 8], src[i + j * 8] + 3.0);
            }
        }
    }

    #[test]
    fn test_scalar_complex_conj() {
        let src: Vec<Complex32> = (0..16)
            .map(|i| Complex32::new(i as f32, 1.0 + i as f32))
            .collect();
        let mut dst = vec![Complex32::new(0.0, 0.0); 16];

        unsafe {
            <ScalarKernel as MicroKernel<Complex32>>::transpose_micro::<Conj>(
                src.as_ptr(),
                4,
                dst.as_mut_ptr(),
                4,
                Update::new(Complex32::new(1.0, 0.0), Complex32::new(0.0, 0.0)),
            );
        }

        for j in 0..4 {
            for i in 0..4 {
                assert_eq!(dst[j + i * 4], src[i + j * 4].conj());
            }
        }
    }
}
