//! # Tensor Kernels Module (`ops`)
//!
//! Eager kernels over concrete [`Tensor`](crate::tensor::Tensor) values. The symbolic
//! graph in [`crate::graph`] only describes computations; a compiled
//! [`Program`](crate::graph::Program) dispatches every node to one of these kernels.
//!
//! ## Key Submodules:
//!
//! - [`elementwise`]: unary and binary element-wise operators.
//! - [`linalg`]: matrix multiplication, transpose and inverse.
//! - [`reduction`]: full sum.
//! - [`view`]: row selection, embedding and stacking along axis 0.

pub mod elementwise;
pub mod linalg;
pub mod reduction;
pub mod view;

pub use elementwise::{BinaryOp, UnaryOp};
