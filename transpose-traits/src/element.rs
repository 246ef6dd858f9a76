//! Scalar element bounds for transposition kernels.

use num_complex::Complex;

/// Width in bytes of the vector registers the micro-kernels are sized for
/// (256-bit, AVX2 class).
pub const REGISTER_BYTES: usize = 32;

/// Number of `T` values that fit in one vector register, at least 1.
pub const fn vector_width<T>() -> usize {
    let size = std::mem::size_of::<T>();
    if size == 0 || size >= REGISTER_BYTES {
        1
    } else {
        REGISTER_BYTES / size
    }
}

/// Element type a transposition can move and scale.
///
/// The engine only needs `alpha * x + beta * y` plus an optional conjugation,
/// so the bound is deliberately small. Real types keep the default
/// [`Element::conj`], which returns `self`.
///
/// ```
/// use transpose_traits::Element;
///
/// assert_eq!(<f64 as Element>::MICRO, 4);
/// assert_eq!(<f32 as Element>::MICRO, 8);
/// assert_eq!(2.5f64.conj(), 2.5);
/// ```
pub trait Element:
    Copy
    + Send
    + Sync
    + std::fmt::Debug
    + PartialEq
    + std::ops::Mul<Output = Self>
    + std::ops::Add<Output = Self>
    + num_traits::Zero
    + num_traits::One
    + 'static
{
    /// Side length of the square micro-tile handled by one micro-kernel call.
    const MICRO: usize = vector_width::<Self>();

    /// Complex conjugate. Identity for real types.
    #[inline(always)]
    fn conj(self) -> Self {
        self
    }
}

macro_rules! impl_element_real {
    ($($t:ty),*) => {
        $(impl Element for $t {})*
    };
}

impl_element_real!(f32, f64, i32, i64, u32, u64);

impl Element for Complex<f32> {
    #[inline(always)]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }
}

impl Element for Complex<f64> {
    #[inline(always)]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::{Complex32, Complex64};

    fn assert_element<T: Element>() {}

    #[test]
    fn test_standard_types() {
        assert_element::<f32>();
        assert_element::<f64>();
        assert_element::<i64>();
        assert_element::<Complex32>();
        assert_element::<Complex64>();
    }

    #[test]
    fn test_micro_sizes() {
        assert_eq!(<f32 as Element>::MICRO, 8);
        assert_eq!(<f64 as Element>::MICRO, 4);
        assert_eq!(<Complex32 as Element>::MICRO, 4);
        assert_eq!(<Complex64 as Element>::MICRO, 2);
    }

    #[test]
    fn test_vector_width_degenerate() {
        assert_eq!(vector_width::<()>(), 1);
        assert_eq!(vector_width::<[f64; 8]>(), 1);
        assert_eq!(vector_width::<u8>(), 32);
    }

    #[test]
    fn test_conj() {
        let z = Complex64::new(1.5, -2.0);
        assert_eq!(z.conj(), Complex64::new(1.5, 2.0));
        assert_eq!(Element::conj(-3.0f32), -3.0);
    }

    #[test]
    fn test_custom_type() {
        // Custom types only need the arithmetic bounds.
        #[derive(Debug, Clone, Copy, PartialEq)]
        struct Fixed(i64);

        impl std::ops::Add for Fixed {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Fixed(self.0 + rhs.0)
            }
        }

        impl std::ops::Mul for Fixed {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Fixed(self.0 * rhs.0 / 1000)
            }
        }

        impl num_traits::Zero for Fixed {
            fn zero() -> Self {
                Fixed(0)
            }
            fn is_zero(&self) -> bool {
                self.0 == 0
            }
        }

        impl num_traits::One for Fixed {
            fn one() -> Self {
                Fixed(1000)
            }
        }

        impl Element for Fixed {}

        assert_element::<Fixed>();
        assert_eq!(<Fixed as Element>::MICRO, 4);
        assert_eq!((Fixed(2000) * Fixed(1500)).0, 3000);
        assert_eq!(Fixed(7).conj(), Fixed(7));
    }
}
