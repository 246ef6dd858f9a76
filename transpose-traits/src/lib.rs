//! Shared traits for the strided-transpose engine.
//!
//! This crate holds the element abstraction the transposition kernels are
//! generic over. It is split out so that external crates can implement
//! [`Element`] for their own scalar types without orphan rule violations.

pub mod element;
pub mod element_op;

pub use element::{vector_width, Element, REGISTER_BYTES};
pub use element_op::{Conj, ElementOp, Identity};
