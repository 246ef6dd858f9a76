//! Axis permutations and the shape helpers built on them.

use crate::{Result, TransposeError};

/// Gather `arr` by `perm`: `out[i] = arr[perm[i]]`.
///
/// Computes the shape of a transposed tensor from the shape of its source.
///
/// # Panics
/// Panics if an entry of `perm` is out of bounds for `arr`.
///
/// # Example
/// ```
/// # use strided_transpose::permute;
/// let shape = &[2, 4, 3, 1];
/// let perm = &[3, 2, 0, 1];
/// assert_eq!(permute(perm, shape), vec![1, 3, 2, 4]);
/// ```
pub fn permute<T: Copy>(perm: &[usize], arr: &[T]) -> Vec<T> {
    perm.iter().map(|&p| arr[p]).collect()
}

/// Scatter `arr` by `perm`: `out[perm[i]] = arr[i]`; undoes [`permute`].
///
/// # Panics
/// Panics if an entry of `perm` is out of bounds for `arr`. If `perm` has
/// repeated entries the result is unspecified.
///
/// # Example
/// ```
/// # use strided_transpose::{inv_permute, permute};
/// let shape = &[2, 4, 3, 1];
/// let perm = &[3, 2, 0, 1];
/// let permuted = permute(perm, shape);
/// assert_eq!(inv_permute(perm, &permuted), vec![2, 4, 3, 1]);
/// ```
pub fn inv_permute<T: Copy>(perm: &[usize], arr: &[T]) -> Vec<T> {
    let mut out = arr.to_vec();
    for (&p, &v) in perm.iter().zip(arr) {
        out[p] = v;
    }
    out
}

/// A validated bijection on `0..dim`.
///
/// Entry `i` names the input axis that becomes output axis `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation {
    axes: Vec<usize>,
}

impl Permutation {
    /// Validate `perm` as a bijection on `0..perm.len()`.
    pub fn new(perm: &[usize]) -> Result<Self> {
        let dim = perm.len();
        if dim == 0 {
            return Err(TransposeError::InvalidPermutation(
                "permutation must not be empty".into(),
            ));
        }
        let mut seen = vec![false; dim];
        for (i, &p) in perm.iter().enumerate() {
            if p >= dim {
                return Err(TransposeError::InvalidPermutation(format!(
                    "entry {i} = {p} is out of range for dim {dim}"
                )));
            }
            if std::mem::replace(&mut seen[p], true) {
                return Err(TransposeError::InvalidPermutation(format!(
                    "axis {p} appears more than once in {perm:?}"
                )));
            }
        }
        Ok(Self {
            axes: perm.to_vec(),
        })
    }

    pub fn identity(dim: usize) -> Self {
        Self {
            axes: (0..dim).collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.axes.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.axes
    }

    pub fn is_identity(&self) -> bool {
        self.axes.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// The permutation undoing this one.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0usize; self.axes.len()];
        for (i, &p) in self.axes.iter().enumerate() {
            inv[p] = i;
        }
        Self { axes: inv }
    }

    /// Output-axis order of per-input-axis values (see [`permute`]).
    pub fn apply<T: Copy>(&self, arr: &[T]) -> Vec<T> {
        permute(&self.axes, arr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid() {
        let p = Permutation::new(&[2, 0, 1]).unwrap();
        assert_eq!(p.dim(), 3);
        assert!(!p.is_identity());
        assert!(Permutation::new(&[0, 1, 2]).unwrap().is_identity());
    }

    #[test]
    fn test_rejects_duplicate() {
        let err = Permutation::new(&[0, 0, 1]).unwrap_err();
        assert!(matches!(err, TransposeError::InvalidPermutation(_)));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Permutation::new(&[0, 3, 1]).unwrap_err();
        assert!(matches!(err, TransposeError::InvalidPermutation(_)));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(Permutation::new(&[]).is_err());
    }

    #[test]
    fn test_inverse() {
        let p = Permutation::new(&[3, 2, 0, 1]).unwrap();
        let inv = p.inverse();
        assert_eq!(inv.as_slice(), &[2, 3, 1, 0]);
        let shape = [5, 6, 7, 8];
        assert_eq!(inv.apply(&p.apply(&shape)), shape.to_vec());
        assert_eq!(p.inverse().inverse(), p);
    }

    #[test]
    fn test_permute_roundtrip() {
        let perm = [1, 3, 0, 2];
        let arr = ['a', 'b', 'c', 'd'];
        let out = permute(&perm, &arr);
        assert_eq!(out, vec!['b', 'd', 'a', 'c']);
        assert_eq!(inv_permute(&perm, &out), arr.to_vec());
    }

    #[test]
    fn test_identity_ctor() {
        assert_eq!(Permutation::identity(3).as_slice(), &[0, 1, 2]);
    }
}
