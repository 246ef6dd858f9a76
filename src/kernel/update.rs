//! How a destination element is combined with its source element.

use transpose_traits::{Element, ElementOp};

/// Update rule `B = α·f(A) + β·B`, specialized once per execution.
///
/// The specialization decides which operands are read: modes that do not
/// read A never touch the source pointer, and [`Update::Overwrite`] never
/// reads B, so B may hold uninitialized garbage (e.g. NaN).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update<T> {
    /// `B = α·f(A)` (β = 0).
    Overwrite { alpha: T },
    /// `B = α·f(A) + β·B`.
    Accumulate { alpha: T, beta: T },
    /// `B = β·B` (α = 0).
    ScaleB { beta: T },
    /// `B = 0` (α = β = 0).
    Zero,
    /// Nothing to do (α = 0, β = 1).
    Keep,
}

impl<T: Element> Update<T> {
    pub fn new(alpha: T, beta: T) -> Self {
        match (alpha.is_zero(), beta.is_zero()) {
            (false, true) => Update::Overwrite { alpha },
            (false, false) => Update::Accumulate { alpha, beta },
            (true, true) => Update::Zero,
            (true, false) if beta.is_one() => Update::Keep,
            (true, false) => Update::ScaleB { beta },
        }
    }

    /// Whether the source tensor is read at all.
    pub fn reads_a(&self) -> bool {
        matches!(self, Update::Overwrite { .. } | Update::Accumulate { .. })
    }

    /// Plain copy: `B = A`, eligible for `memcpy`.
    pub fn is_copy<Op: ElementOp<T>>(&self) -> bool {
        Op::IS_IDENTITY && matches!(self, Update::Overwrite { alpha } if alpha.is_one())
    }

    /// Combine one source element into one destination element.
    ///
    /// # Safety
    /// `src` must be readable and `dst` readable and writable. Only valid for
    /// modes where [`Update::reads_a`] is true; other modes go through
    /// [`Update::rescale`].
    #[inline(always)]
    pub unsafe fn store<Op: ElementOp<T>>(self, src: *const T, dst: *mut T) {
        match self {
            Update::Overwrite { alpha } => *dst = alpha * Op::apply(*src),
            Update::Accumulate { alpha, beta } => *dst = alpha * Op::apply(*src) + beta * *dst,
            _ => self.rescale(dst),
        }
    }

    /// Update one destination element without reading the source.
    ///
    /// # Safety
    /// `dst` must be writable, and readable for [`Update::ScaleB`].
    #[inline(always)]
    pub unsafe fn rescale(self, dst: *mut T) {
        match self {
            Update::ScaleB { beta } => *dst = beta * *dst,
            Update::Zero => *dst = T::zero(),
            _ => {}
        }
    }
}
