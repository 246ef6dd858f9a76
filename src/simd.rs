//! Runtime target-feature dispatch around the kernels.
//!
//! With the `simd` feature, a worker's tile loop is re-entered through
//! `pulp::Arch::dispatch`, so the inlined scalar kernels are compiled and
//! vectorized for the best instruction set detected at runtime.

#[inline(always)]
pub(crate) fn dispatch<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(feature = "simd")]
    {
        pulp::Arch::new().dispatch(f)
    }
    #[cfg(not(feature = "simd"))]
    {
        f()
    }
}

/// Elements below which a worker runs its tiles without dispatching.
///
/// A tile sized for the default working set holds a few hundred elements for
/// every element type, so a worker owning even one full tile dispatches. Only
/// scalar plans and tensors of a handful of elements skip the detection,
/// whose cost is comparable to such a copy.
pub(crate) const DISPATCH_THRESHOLD: usize = 64;

/// Dispatch only when `len` elements amortize the detection.
#[inline(always)]
pub(crate) fn dispatch_if_large<R>(len: usize, f: impl FnOnce() -> R) -> R {
    if len >= DISPATCH_THRESHOLD {
        dispatch(f)
    } else {
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_runs_closure() {
        let v: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let s = dispatch_if_large(v.len(), || v.iter().sum::<f64>());
        assert_eq!(s, 4950.0);
        assert_eq!(dispatch_if_large(3, || 7), 7);
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(dispatch_if_large(DISPATCH_THRESHOLD - 1, || 1), 1);
        assert_eq!(dispatch_if_large(DISPATCH_THRESHOLD, || 2), 2);
    }
}
