/// Errors reported while building or executing a transposition plan.
///
/// Every variant is detected before any element of `B` is written.
#[derive(Debug, thiserror::Error)]
pub enum TransposeError {
    /// A size is not positive, an outer size is smaller than its size, or the
    /// dimensionality is inconsistent.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// The permutation is not a bijection on `0..dim`, or has the wrong length.
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Negative thread count.
    #[error("invalid thread count {0}")]
    InvalidThreadCount(i64),

    /// A caller-provided buffer cannot hold the layout it is described by.
    #[error("buffer {which} too small: layout needs {required} elements, got {actual}")]
    BufferTooSmall {
        which: &'static str,
        required: usize,
        actual: usize,
    },

    /// A required pointer was null at the C boundary.
    #[error("null pointer passed for {0}")]
    NullPointer(&'static str),

    /// The worker pool could not be created.
    #[cfg(feature = "parallel")]
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience alias for `Result<T, TransposeError>`.
pub type Result<T> = std::result::Result<T, TransposeError>;
