use crate::error::NeuroptError;
use crate::graph::{Graph, NodeId};
use crate::tensor::Tensor;
use std::fmt;

/// A trainable tensor: a named variable of the graph together with its
/// initial value.
///
/// The value the parameter holds during training lives in a
/// [`ParameterStore`](crate::graph::ParameterStore) and is replaced once per
/// executed step; `Parameter` only remembers the symbolic handle.
#[derive(Clone, PartialEq)]
pub struct Parameter {
    name: String,
    node: NodeId,
    value: Tensor,
}

impl Parameter {
    /// Declares a new variable named `name` with the shape of `value`.
    ///
    /// # Errors
    /// Returns `DuplicateVariable` if `graph` already has a variable of that name.
    pub fn new(graph: &mut Graph, name: impl Into<String>, value: Tensor) -> Result<Self, NeuroptError> {
        let name = name.into();
        let node = graph.variable(name.clone(), value.shape().to_vec())?;
        Ok(Parameter { name, node, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The graph variable standing for this parameter.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    /// Number of scalar entries.
    pub fn numel(&self) -> usize {
        self.value.numel()
    }

    pub fn initial_value(&self) -> &Tensor {
        &self.value
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({} {}, shape={:?})", self.name, self.node, self.value.shape())
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
