//! Plan-based out-of-place tensor transposition.
//!
//! Computes
//!
//! ```text
//! B[π(i₀,i₁,...)] = α·f(A[i₀,i₁,...]) + β·B[π(i₀,i₁,...)]
//! ```
//!
//! for an arbitrary axis permutation π, with `f` the identity or complex
//! conjugation. Both tensors may be sub-tensors of larger buffers (outer
//! sizes), shapes may be read as column-major or row-major, and execution is
//! split across threads.
//!
//! # Core Types
//!
//! - [`TransposePlan`]: analysis (fusion, loop order, blocking, thread
//!   partition) done once, then replayed on any number of buffers
//! - [`PlanOptions`]: tunables for plan construction
//! - [`TensorLayout`] / [`MajorOrder`]: sizes, outer sizes and strides of one tensor
//! - [`Permutation`]: a validated axis permutation
//!
//! # Bindings
//!
//! - [`s_tensor_transpose`], [`d_tensor_transpose`], [`c_tensor_transpose`],
//!   [`z_tensor_transpose`]: one-shot transposes with `int`-typed shapes
//! - [`transpose`], [`transpose_simple`]: Vec-returning conveniences
//! - [`capi`]: `sTensorTranspose` and friends for C callers
//!
//! # Example
//!
//! ```rust
//! use strided_transpose::{MajorOrder, TransposePlan};
//!
//! // A is 2×3×4 (column-major); B = A permuted to 4×2×3
//! let a: Vec<f64> = (0..24).map(|i| i as f64).collect();
//! let mut b = vec![0.0; 24];
//! let plan = TransposePlan::<f64>::new(&[2, 0, 1], &[2, 3, 4], None, None, 1, MajorOrder::ColumnMajor)
//!     .unwrap();
//! plan.execute(1.0, &a, 0.0, &mut b).unwrap();
//!
//! // B[k, i, j] == A[i, j, k]
//! assert_eq!(b[1 + 4 * (1 + 2 * 2)], a[1 + 2 * (2 + 3 * 1)]);
//! ```
//!
//! # Cache Optimization
//!
//! - Axes of extent 1 are dropped and axes contiguous in both tensors are fused
//! - The two innermost axes are tiled so an A tile and a B tile fit in
//!   [`DEFAULT_TILE_WORKING_SET`] bytes (a quarter of [`BLOCK_MEMORY_SIZE`])
//! - Tiles are transposed as a grid of register-sized micro-tiles

pub mod analyze;
pub mod api;
pub mod block;
pub mod capi;
mod error;
pub mod fuse;
pub mod kernel;
pub mod layout;
pub mod permutation;
pub mod plan;
mod simd;
pub mod threading;
pub mod tile;

pub use transpose_traits::{Conj, Element, ElementOp, Identity};

pub use error::{Result, TransposeError};

// ============================================================================
// Plans
// ============================================================================
pub use analyze::ExecMode;
pub use layout::{MajorOrder, TensorLayout};
pub use permutation::{inv_permute, permute, Permutation};
pub use plan::{PlanOptions, TransposePlan};
pub use threading::{partition, MINTHREADLENGTH};
#[cfg(feature = "parallel")]
pub use threading::WorkerPool;

// ============================================================================
// Bindings
// ============================================================================
pub use api::{
    c_tensor_transpose, d_tensor_transpose, default_num_threads, default_row_major,
    s_tensor_transpose, set_number_of_threads, set_row_major, tensor_transpose, transpose,
    transpose_simple, z_tensor_transpose,
};

// ============================================================================
// Constants
// ============================================================================

/// L1 block size the tiling targets.
pub const BLOCK_MEMORY_SIZE: usize = 32 * 1024;

/// Bytes for one A tile plus one B tile.
pub const DEFAULT_TILE_WORKING_SET: usize = BLOCK_MEMORY_SIZE / 4;
