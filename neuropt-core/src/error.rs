use thiserror::Error;

/// Custom error type for the neuropt framework.
///
/// Errors fall in three groups: configuration errors raised while building an
/// option set or configuring an instance, shape errors raised while building a
/// graph, and numeric errors raised while a compiled program runs.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum NeuroptError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Incompatible shapes for operation {operation}: {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
        operation: String,
    },

    #[error("Cannot broadcast shape {from:?} to {to:?}")]
    BroadcastError { from: Vec<usize>, to: Vec<usize> },

    #[error("Index out of bounds: index {index} for shape {shape:?}")]
    IndexOutOfBounds { index: usize, shape: Vec<usize> },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Invalid distribution parameters: {0}")]
    InvalidDistribution(String),

    #[error("Cannot stack an empty list of tensors")]
    EmptyTensorList,

    #[error("Matrix of size {size}x{size} is singular and cannot be inverted")]
    SingularMatrix { size: usize },

    #[error("Gradient requested for non-scalar output of shape {shape:?}")]
    NonScalarOutput { shape: Vec<usize> },

    #[error("Node {0} does not belong to this graph")]
    UnknownNode(usize),

    #[error("Variable '{0}' is declared twice in the same graph")]
    DuplicateVariable(String),

    #[error("Variable '{0}' has no bound value")]
    UnboundVariable(String),

    #[error("Invalid option '{option}' for {owner}. Available options: {available:?}")]
    InvalidOption {
        option: String,
        owner: String,
        available: Vec<String>,
    },

    #[error("Invalid value for option '{option}': {reason}")]
    InvalidOptionValue { option: String, reason: String },

    #[error("Option '{option}' = {value} violates bound: {bound}")]
    BoundViolation {
        option: String,
        value: f64,
        bound: String,
    },

    #[error("Option '{option}' is required for {owner}")]
    MissingOption { option: String, owner: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
