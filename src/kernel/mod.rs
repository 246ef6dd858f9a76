//! Tile kernels.
//!
//! - [`update`]: the `α·f(A) + β·B` rule, specialized per execution
//! - [`micro`]: MICRO × MICRO register-sized transpose
//! - [`macro_kernel`]: one tile, as a grid of micro-kernels plus edges, a
//!   linear run, a general strided tile, or a B-only rescale

pub mod macro_kernel;
pub mod micro;
pub mod update;

pub use macro_kernel::KernelStrides;
pub use update::Update;
