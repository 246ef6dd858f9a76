//! Strict-C entry points.
//!
//! ```c
//! void dTensorTranspose(const int *perm, const int dim,
//!                       const double alpha, const double *A, const int *sizeA, const int *outerSizeA,
//!                       const double beta, double *B, const int *outerSizeB,
//!                       const int numThreads, const int useRowMajor);
//! ```
//!
//! `outerSizeA` / `outerSizeB` may be null. There is no status channel:
//! invalid arguments are logged at `error` level and the call returns
//! without touching `B`.

#![allow(non_snake_case)]

use std::ffi::c_int;

use num_complex::{Complex32, Complex64};
use transpose_traits::Element;

use crate::api::{threads_from_i32, Request};
use crate::{Result, TransposeError};

/// Borrow `len` ints from a C array, rejecting null.
unsafe fn int_slice<'a>(ptr: *const c_int, len: usize, what: &'static str) -> Result<&'a [i32]> {
    if ptr.is_null() {
        return Err(TransposeError::NullPointer(what));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

unsafe fn optional_int_slice<'a>(ptr: *const c_int, len: usize) -> Option<&'a [i32]> {
    (!ptr.is_null()).then(|| std::slice::from_raw_parts(ptr, len))
}

#[allow(clippy::too_many_arguments)]
unsafe fn try_transpose<T: Element>(
    perm: *const c_int,
    dim: c_int,
    alpha: T,
    conj_a: bool,
    a: *const T,
    size_a: *const c_int,
    outer_size_a: *const c_int,
    beta: T,
    b: *mut T,
    outer_size_b: *const c_int,
    num_threads: c_int,
    use_row_major: c_int,
) -> Result<()> {
    let dim = match usize::try_from(dim) {
        Ok(d) if d > 0 => d,
        _ => {
            return Err(TransposeError::InvalidShape(format!(
                "dimension must be positive, got {dim}"
            )))
        }
    };
    let perm = int_slice(perm, dim, "perm")?;
    let size_a = int_slice(size_a, dim, "sizeA")?;
    let outer_a = optional_int_slice(outer_size_a, dim);
    let outer_b = optional_int_slice(outer_size_b, dim);
    let num_threads = threads_from_i32(num_threads)?;

    let request = Request::parse(perm, size_a, outer_a, outer_b, num_threads, use_row_major != 0, conj_a)?;
    let plan = request.plan::<T>()?;

    if b.is_null() {
        return Err(TransposeError::NullPointer("B"));
    }
    let b = std::slice::from_raw_parts_mut(b, plan.layout_b().required_len());
    let a: &[T] = if alpha.is_zero() {
        &[]
    } else if a.is_null() {
        return Err(TransposeError::NullPointer("A"));
    } else {
        std::slice::from_raw_parts(a, plan.layout_a().required_len())
    };
    plan.execute(alpha, a, beta, b)
}

macro_rules! log_failure {
    ($name:literal, $call:expr) => {
        if let Err(err) = $call {
            log::error!("{}: {}", $name, err);
        }
    };
}

/// # Safety
/// `perm` and `sizeA` must point to `dim` ints; `outerSizeA`/`outerSizeB` to
/// `dim` ints or be null. `A` (unless `alpha == 0`) and `B` must cover their
/// layouts and must not overlap.
#[no_mangle]
pub unsafe extern "C" fn sTensorTranspose(
    perm: *const c_int,
    dim: c_int,
    alpha: f32,
    A: *const f32,
    sizeA: *const c_int,
    outerSizeA: *const c_int,
    beta: f32,
    B: *mut f32,
    outerSizeB: *const c_int,
    numThreads: c_int,
    useRowMajor: c_int,
) {
    log_failure!(
        "sTensorTranspose",
        try_transpose(perm, dim, alpha, false, A, sizeA, outerSizeA, beta, B, outerSizeB, numThreads, useRowMajor)
    );
}

/// # Safety
/// See [`sTensorTranspose`].
#[no_mangle]
pub unsafe extern "C" fn dTensorTranspose(
    perm: *const c_int,
    dim: c_int,
    alpha: f64,
    A: *const f64,
    sizeA: *const c_int,
    outerSizeA: *const c_int,
    beta: f64,
    B: *mut f64,
    outerSizeB: *const c_int,
    numThreads: c_int,
    useRowMajor: c_int,
) {
    log_failure!(
        "dTensorTranspose",
        try_transpose(perm, dim, alpha, false, A, sizeA, outerSizeA, beta, B, outerSizeB, numThreads, useRowMajor)
    );
}

/// # Safety
/// See [`sTensorTranspose`].
#[no_mangle]
pub unsafe extern "C" fn cTensorTranspose(
    perm: *const c_int,
    dim: c_int,
    alpha: Complex32,
    conjA: bool,
    A: *const Complex32,
    sizeA: *const c_int,
    outerSizeA: *const c_int,
    beta: Complex32,
    B: *mut Complex32,
    outerSizeB: *const c_int,
    numThreads: c_int,
    useRowMajor: c_int,
) {
    log_failure!(
        "cTensorTranspose",
        try_transpose(perm, dim, alpha, conjA, A, sizeA, outerSizeA, beta, B, outerSizeB, numThreads, useRowMajor)
    );
}

/// # Safety
/// See [`sTensorTranspose`].
#[no_mangle]
pub unsafe extern "C" fn zTensorTranspose(
    perm: *const c_int,
    dim: c_int,
    alpha: Complex64,
    conjA: bool,
    A: *const Complex64,
    sizeA: *const c_int,
    outerSizeA: *const c_int,
    beta: Complex64,
    B: *mut Complex64,
    outerSizeB: *const c_int,
    numThreads: c_int,
    useRowMajor: c_int,
) {
    log_failure!(
        "zTensorTranspose",
        try_transpose(perm, dim, alpha, conjA, A, sizeA, outerSizeA, beta, B, outerSizeB, numThreads, useRowMajor)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_b_is_rejected() {
        let perm = [1, 0];
        let size = [2, 3];
        let a = [0.0f64; 6];
        let err = unsafe {
            try_transpose(
                perm.as_ptr(),
                2,
                1.0,
                false,
                a.as_ptr(),
                size.as_ptr(),
                std::ptr::null(),
                0.0,
                std::ptr::null_mut::<f64>(),
                std::ptr::null(),
                1,
                0,
            )
        };
        assert!(matches!(err, Err(TransposeError::NullPointer("B"))));
    }

    #[test]
    fn test_zero_dim_is_rejected() {
        let err = unsafe {
            try_transpose::<f32>(
                std::ptr::null(),
                0,
                1.0,
                false,
                std::ptr::null(),
                std::ptr::null(),
                std::ptr::null(),
                0.0,
                std::ptr::null_mut(),
                std::ptr::null(),
                1,
                0,
            )
        };
        assert!(matches!(err, Err(TransposeError::InvalidShape(_))));
    }

    #[test]
    fn test_null_a_allowed_when_alpha_zero() {
        let perm = [1, 0];
        let size = [2, 2];
        let mut b = [4.0f32; 4];
        unsafe {
            try_transpose(
                perm.as_ptr(),
                2,
                0.0,
                false,
                std::ptr::null(),
                size.as_ptr(),
                std::ptr::null(),
                0.5,
                b.as_mut_ptr(),
                std::ptr::null(),
                1,
                0,
            )
        }
        .unwrap();
        assert_eq!(b, [2.0; 4]);
    }
}
