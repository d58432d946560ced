// Core modules of the crate
pub mod autograd;
pub mod config;
pub mod error;
pub mod graph;
pub mod nn;
pub mod ops;
pub mod tensor;

// Re-export the main types so they are reachable as `neuropt_core::Tensor`, etc.
pub use error::NeuroptError;
pub use graph::program::Feed;
pub use graph::{Graph, NodeId, ParameterStore, Program, Update};
pub use tensor::Tensor;
// Re-export traits required by public functions
pub use num_traits;
