//! Trainable parameters and their initializers.

pub mod init;
pub mod parameter;

pub use parameter::Parameter;
