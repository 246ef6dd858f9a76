//! Per-datatype entry points and Vec-returning conveniences.
//!
//! These functions take the classic `int`-typed parameter list (`&[i32]`
//! sizes, `i32` thread count, `bool` row-major flag), validate and convert it,
//! then build a one-shot [`TransposePlan`] and execute it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use num_complex::{Complex32, Complex64};
use transpose_traits::Element;

use crate::layout::MajorOrder;
use crate::plan::{PlanOptions, TransposePlan};
use crate::{Result, TransposeError};

static DEFAULT_NUM_THREADS: AtomicUsize = AtomicUsize::new(1);
static DEFAULT_ROW_MAJOR: AtomicBool = AtomicBool::new(false);

/// Set the thread count used by [`transpose_simple`].
pub fn set_number_of_threads(threads: usize) {
    DEFAULT_NUM_THREADS.store(threads, Ordering::Relaxed);
}

pub fn default_num_threads() -> usize {
    DEFAULT_NUM_THREADS.load(Ordering::Relaxed)
}

/// Set whether [`transpose_simple`] interprets shapes as row-major.
pub fn set_row_major(row_major: bool) {
    DEFAULT_ROW_MAJOR.store(row_major, Ordering::Relaxed);
}

pub fn default_row_major() -> bool {
    DEFAULT_ROW_MAJOR.load(Ordering::Relaxed)
}

pub(crate) fn sizes_from_i32(values: &[i32], what: &str) -> Result<Vec<usize>> {
    values
        .iter()
        .enumerate()
        .map(|(axis, &v)| {
            usize::try_from(v).map_err(|_| {
                TransposeError::InvalidShape(format!("{what}[{axis}] = {v} is negative"))
            })
        })
        .collect()
}

pub(crate) fn perm_from_i32(perm: &[i32]) -> Result<Vec<usize>> {
    perm.iter()
        .map(|&p| {
            usize::try_from(p).map_err(|_| {
                TransposeError::InvalidPermutation(format!("negative axis {p} in {perm:?}"))
            })
        })
        .collect()
}

pub(crate) fn threads_from_i32(num_threads: i32) -> Result<usize> {
    usize::try_from(num_threads).map_err(|_| TransposeError::InvalidThreadCount(num_threads.into()))
}

/// Parameters converted from the `int`-typed surface.
pub(crate) struct Request {
    perm: Vec<usize>,
    size_a: Vec<usize>,
    outer_a: Option<Vec<usize>>,
    outer_b: Option<Vec<usize>>,
    options: PlanOptions,
}

impl Request {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn parse(
        perm: &[i32],
        size_a: &[i32],
        outer_a: Option<&[i32]>,
        outer_b: Option<&[i32]>,
        num_threads: usize,
        row_major: bool,
        conjugate: bool,
    ) -> Result<Self> {
        Ok(Self {
            perm: perm_from_i32(perm)?,
            size_a: sizes_from_i32(size_a, "size_a")?,
            outer_a: outer_a.map(|o| sizes_from_i32(o, "outer_size_a")).transpose()?,
            outer_b: outer_b.map(|o| sizes_from_i32(o, "outer_size_b")).transpose()?,
            options: PlanOptions {
                num_threads,
                major_order: MajorOrder::from_row_major(row_major),
                conjugate,
                ..PlanOptions::default()
            },
        })
    }

    pub(crate) fn plan<T: Element>(&self) -> Result<TransposePlan<T>> {
        TransposePlan::with_options(
            &self.perm,
            &self.size_a,
            self.outer_a.as_deref(),
            self.outer_b.as_deref(),
            &self.options,
        )
    }
}

/// `B[π(i)] = α·f(A[i]) + β·B[π(i)]` for any element type.
///
/// `f` is complex conjugation when `conjugate` is set, the identity
/// otherwise (conjugating a real type is a no-op). `None` outer sizes mean the
/// tensor fills its buffer.
#[allow(clippy::too_many_arguments)]
pub fn tensor_transpose<T: Element>(
    perm: &[i32],
    alpha: T,
    conjugate: bool,
    a: &[T],
    size_a: &[i32],
    outer_a: Option<&[i32]>,
    beta: T,
    b: &mut [T],
    outer_b: Option<&[i32]>,
    num_threads: i32,
    row_major: bool,
) -> Result<()> {
    let num_threads = threads_from_i32(num_threads)?;
    let request = Request::parse(perm, size_a, outer_a, outer_b, num_threads, row_major, conjugate)?;
    request.plan::<T>()?.execute(alpha, a, beta, b)
}

macro_rules! real_binding {
    ($(#[$doc:meta])* $name:ident, $t:ty) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name(
            perm: &[i32],
            alpha: $t,
            a: &[$t],
            size_a: &[i32],
            outer_a: Option<&[i32]>,
            beta: $t,
            b: &mut [$t],
            outer_b: Option<&[i32]>,
            num_threads: i32,
            row_major: bool,
        ) -> Result<()> {
            tensor_transpose(
                perm, alpha, false, a, size_a, outer_a, beta, b, outer_b, num_threads, row_major,
            )
        }
    };
}

macro_rules! complex_binding {
    ($(#[$doc:meta])* $name:ident, $t:ty) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name(
            perm: &[i32],
            alpha: $t,
            conj_a: bool,
            a: &[$t],
            size_a: &[i32],
            outer_a: Option<&[i32]>,
            beta: $t,
            b: &mut [$t],
            outer_b: Option<&[i32]>,
            num_threads: i32,
            row_major: bool,
        ) -> Result<()> {
            tensor_transpose(
                perm, alpha, conj_a, a, size_a, outer_a, beta, b, outer_b, num_threads, row_major,
            )
        }
    };
}

real_binding!(
    /// Single-precision real transpose.
    s_tensor_transpose,
    f32
);
real_binding!(
    /// Double-precision real transpose.
    d_tensor_transpose,
    f64
);
complex_binding!(
    /// Single-precision complex transpose, optionally conjugating A.
    c_tensor_transpose,
    Complex32
);
complex_binding!(
    /// Double-precision complex transpose, optionally conjugating A.
    z_tensor_transpose,
    Complex64
);

/// Transpose into `b`, or into a freshly allocated buffer, and return it.
///
/// A newly allocated (or empty) `b` is zero-filled to the required length of
/// the B layout before the update runs. A non-empty `b` must already be at
/// least that long.
///
/// # Example
/// ```
/// use strided_transpose::transpose;
///
/// // 2×3 column-major → 3×2
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let b = transpose(&[1, 0], 1.0, &a, &[2, 3], None, 0.0, None, None, 1, false).unwrap();
/// assert_eq!(b, vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn transpose<T: Element>(
    perm: &[i32],
    alpha: T,
    a: &[T],
    size_a: &[i32],
    outer_a: Option<&[i32]>,
    beta: T,
    b: Option<Vec<T>>,
    outer_b: Option<&[i32]>,
    num_threads: usize,
    row_major: bool,
) -> Result<Vec<T>> {
    let request = Request::parse(perm, size_a, outer_a, outer_b, num_threads, row_major, false)?;
    let plan = request.plan::<T>()?;
    let required = plan.layout_b().required_len();
    let mut out = match b {
        Some(v) if !v.is_empty() => v,
        _ => vec![T::zero(); required],
    };
    plan.execute(alpha, a, beta, &mut out)?;
    Ok(out)
}

/// Permute the axes of `a` with the process-wide defaults.
///
/// Uses `α = 1`, `β = 0`, [`default_num_threads`] and [`default_row_major`].
///
/// # Example
/// ```
/// use strided_transpose::transpose_simple;
///
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let b = transpose_simple(&[1, 0], &a, &[2, 3]).unwrap();
/// assert_eq!(b[1], a[2]);
/// assert_eq!(b[2], a[4]);
/// ```
pub fn transpose_simple<T: Element>(perm: &[i32], a: &[T], size_a: &[i32]) -> Result<Vec<T>> {
    transpose(
        perm,
        T::one(),
        a,
        size_a,
        None,
        T::zero(),
        None,
        None,
        default_num_threads(),
        default_row_major(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_inputs() {
        let a = [0.0f64; 6];
        let mut b = [0.0f64; 6];
        assert!(matches!(
            d_tensor_transpose(&[1, -1], 1.0, &a, &[2, 3], None, 0.0, &mut b, None, 1, false),
            Err(TransposeError::InvalidPermutation(_))
        ));
        assert!(matches!(
            d_tensor_transpose(&[1, 0], 1.0, &a, &[2, -3], None, 0.0, &mut b, None, 1, false),
            Err(TransposeError::InvalidShape(_))
        ));
        assert!(matches!(
            d_tensor_transpose(&[1, 0], 1.0, &a, &[2, 3], None, 0.0, &mut b, None, -2, false),
            Err(TransposeError::InvalidThreadCount(-2))
        ));
    }

    #[test]
    fn test_s_tensor_transpose_with_outer_sizes() {
        // 2×2 block of a 3×3 buffer into a 2×2 block of a 4×2 buffer
        let a: Vec<f32> = (0..9).map(|i| i as f32).collect();
        let mut b = vec![-1.0f32; 8];
        s_tensor_transpose(&[1, 0], 1.0, &a, &[2, 2], Some(&[3, 3]), 0.0, &mut b, Some(&[4, 2]), 1, false)
            .unwrap();
        assert_eq!(b, vec![0.0, 3.0, -1.0, -1.0, 1.0, 4.0, -1.0, -1.0]);
    }

    #[test]
    fn test_z_tensor_transpose_conj() {
        let a: Vec<Complex64> = (0..6).map(|i| Complex64::new(i as f64, 2.0)).collect();
        let mut b = vec![Complex64::new(0.0, 0.0); 6];
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        z_tensor_transpose(&[1, 0], one, true, &a, &[2, 3], None, zero, &mut b, None, 1, false)
            .unwrap();
        assert_eq!(b[1], Complex64::new(2.0, -2.0));
        assert_eq!(b[3], Complex64::new(1.0, -2.0));
    }

    #[test]
    fn test_transpose_reuses_given_buffer() {
        let a = [1.0f64, 2.0, 3.0, 4.0];
        let b = transpose(&[1, 0], 1.0, &a, &[2, 2], None, 1.0, Some(vec![10.0; 4]), None, 1, false)
            .unwrap();
        assert_eq!(b, vec![11.0, 13.0, 12.0, 14.0]);

        let too_small = transpose(&[1, 0], 1.0, &a, &[2, 2], None, 0.0, Some(vec![0.0; 3]), None, 1, false);
        assert!(matches!(too_small, Err(TransposeError::BufferTooSmall { which: "B", .. })));

        let empty = transpose(&[1, 0], 1.0, &a, &[2, 2], None, 1.0, Some(Vec::new()), None, 1, false)
            .unwrap();
        assert_eq!(empty, vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_transpose_row_major_integers() {
        // row-major 2×3 [[1,2,3],[4,5,6]] → 3×2 [[1,4],[2,5],[3,6]]
        let a = [1i32, 2, 3, 4, 5, 6];
        let b = transpose(&[1, 0], 1, &a, &[2, 3], None, 0, None, None, 1, true).unwrap();
        assert_eq!(b, vec![1, 4, 2, 5, 3, 6]);
    }
}
