//! Element-wise operation applied to the source while it is copied.
//!
//! The operation is chosen at the type level so the inner loops of the
//! kernels are monomorphized per operation and never branch on a flag.

use crate::element::Element;

/// Element-wise operation applied to every source value.
pub trait ElementOp<T>: Copy + Default + Send + Sync + 'static {
    /// Whether this operation is the identity (no-op).
    const IS_IDENTITY: bool = false;

    /// Apply the operation to a value.
    fn apply(value: T) -> T;
}

/// Identity operation: f(x) = x
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

/// Complex conjugate operation: f(x) = conj(x)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conj;

impl<T: Copy> ElementOp<T> for Identity {
    const IS_IDENTITY: bool = true;

    #[inline(always)]
    fn apply(value: T) -> T {
        value
    }
}

impl<T: Element> ElementOp<T> for Conj {
    #[inline(always)]
    fn apply(value: T) -> T {
        value.conj()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_identity() {
        let x = Complex64::new(3.0, 4.0);
        assert_eq!(<Identity as ElementOp<Complex64>>::apply(x), x);
        assert!(<Identity as ElementOp<Complex64>>::IS_IDENTITY);
    }

    #[test]
    fn test_conj() {
        let x = Complex64::new(3.0, 4.0);
        assert_eq!(
            <Conj as ElementOp<Complex64>>::apply(x),
            Complex64::new(3.0, -4.0)
        );
        assert!(!<Conj as ElementOp<Complex64>>::IS_IDENTITY);
    }

    #[test]
    fn test_conj_real() {
        assert_eq!(<Conj as ElementOp<f64>>::apply(3.0), 3.0);
    }

    #[test]
    fn test_conj_twice() {
        let x = Complex64::new(-1.0, 0.25);
        let twice = <Conj as ElementOp<Complex64>>::apply(<Conj as ElementOp<Complex64>>::apply(x));
        assert_eq!(twice, x);
    }
}
