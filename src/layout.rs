//! Index space model: logical sizes, outer sizes and strides of one tensor.

use crate::{Result, TransposeError};

/// Convention deciding which axis varies fastest in linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum MajorOrder {
    /// First axis has stride 1 (Fortran order).
    #[default]
    ColumnMajor,
    /// Last axis has stride 1 (C order).
    RowMajor,
}

impl MajorOrder {
    /// Map the C-style `useRowMajor` flag to a major order.
    pub fn from_row_major(row_major: bool) -> Self {
        if row_major {
            MajorOrder::RowMajor
        } else {
            MajorOrder::ColumnMajor
        }
    }

    pub fn is_row_major(self) -> bool {
        self == MajorOrder::RowMajor
    }
}

/// Compute column-major strides (first index varies fastest).
///
/// Returns `None` if the stride of some axis overflows `isize`.
pub fn col_major_strides(outer_sizes: &[usize]) -> Option<Vec<isize>> {
    let mut strides = Vec::with_capacity(outer_sizes.len());
    let mut acc = 1isize;
    for &n in outer_sizes {
        strides.push(acc);
        acc = acc.checked_mul(isize::try_from(n).ok()?)?;
    }
    Some(strides)
}

/// Compute row-major strides (last index varies fastest).
///
/// Returns `None` if the stride of some axis overflows `isize`.
pub fn row_major_strides(outer_sizes: &[usize]) -> Option<Vec<isize>> {
    let mut strides = vec![0isize; outer_sizes.len()];
    let mut acc = 1isize;
    for (stride, &n) in strides.iter_mut().zip(outer_sizes).rev() {
        *stride = acc;
        acc = acc.checked_mul(isize::try_from(n).ok()?)?;
    }
    Some(strides)
}

/// Shape of one tensor embedded in a (possibly larger) buffer.
///
/// `outer_sizes[i] >= sizes[i]` for every axis; strides are derived from the
/// outer sizes and the major order and are always strictly positive, so no two
/// logical elements share an offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorLayout {
    sizes: Vec<usize>,
    outer_sizes: Vec<usize>,
    strides: Vec<isize>,
    order: MajorOrder,
}

impl TensorLayout {
    /// Validate `sizes` / `outer_sizes` and derive strides.
    ///
    /// `None` for `outer_sizes` means the tensor fills its buffer exactly.
    pub fn new(sizes: &[usize], outer_sizes: Option<&[usize]>, order: MajorOrder) -> Result<Self> {
        if sizes.is_empty() {
            return Err(TransposeError::InvalidShape(
                "tensor must have at least one axis".into(),
            ));
        }
        if let Some(axis) = sizes.iter().position(|&n| n == 0) {
            return Err(TransposeError::InvalidShape(format!(
                "size of axis {axis} must be positive"
            )));
        }

        let outer_sizes = match outer_sizes {
            None => sizes.to_vec(),
            Some(outer) => {
                if outer.len() != sizes.len() {
                    return Err(TransposeError::InvalidShape(format!(
                        "expected {} outer sizes, got {}",
                        sizes.len(),
                        outer.len()
                    )));
                }
                for (axis, (&n, &o)) in sizes.iter().zip(outer).enumerate() {
                    if o < n {
                        return Err(TransposeError::InvalidShape(format!(
                            "outer size {o} of axis {axis} is smaller than its size {n}"
                        )));
                    }
                }
                outer.to_vec()
            }
        };

        let strides = match order {
            MajorOrder::ColumnMajor => col_major_strides(&outer_sizes),
            MajorOrder::RowMajor => row_major_strides(&outer_sizes),
        }
        .ok_or_else(|| {
            TransposeError::InvalidShape(format!("outer sizes {outer_sizes:?} overflow isize"))
        })?;

        Ok(Self {
            sizes: sizes.to_vec(),
            outer_sizes,
            strides,
            order,
        })
    }

    pub fn dim(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn outer_sizes(&self) -> &[usize] {
        &self.outer_sizes
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn order(&self) -> MajorOrder {
        self.order
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    /// Always false: every axis has a positive size.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Minimum backing buffer length: largest addressed offset plus one.
    pub fn required_len(&self) -> usize {
        1 + self
            .sizes
            .iter()
            .zip(&self.strides)
            .map(|(&n, &s)| (n - 1) * s as usize)
            .sum::<usize>()
    }

    /// True when the tensor fills its buffer without padding.
    pub fn is_dense(&self) -> bool {
        self.sizes == self.outer_sizes
    }

    /// Linear offset of a multi-index.
    pub fn offset(&self, index: &[usize]) -> isize {
        debug_assert_eq!(index.len(), self.dim());
        index
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i as isize * s)
            .sum()
    }
}
