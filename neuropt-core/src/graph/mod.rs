//! # Expression Graph Module (`graph`)
//!
//! A [`Graph`] is an append-only arena of [`Node`]s. Building a node never
//! computes anything: it records the operation, its inputs and its statically
//! inferred output shape. Gradients are built symbolically on the same graph
//! (see [`crate::autograd`]), so they can themselves be differentiated.
//! A [`Program`] compiles a set of outputs and parameter updates once and can
//! then be executed any number of times.
//!
//! Because nodes may only reference nodes created before them, increasing
//! [`NodeId`] order is always a valid topological order.

use crate::error::NeuroptError;
use crate::ops::{BinaryOp, UnaryOp};
use crate::tensor::{self, broadcast_utils::can_broadcast, Tensor};
use std::collections::HashMap;
use std::fmt;

pub mod program;

pub use program::{ParameterStore, Program, Update};

/// Identifier of a node inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the graph arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// The operation a node performs.
///
/// Shape-changing operations (`Reshape`, `BroadcastTo`, `SumTo`, `Embed`)
/// take their target shape from the node's own shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Constant(Tensor),
    /// A named placeholder bound at run time, either an input or a parameter.
    Variable(String),
    Unary(UnaryOp),
    Binary(BinaryOp),
    MatMul,
    Transpose,
    Inverse,
    Reshape,
    BroadcastTo,
    SumTo,
    /// Full reduction to a scalar.
    Sum,
    /// Row `i` along axis 0.
    Select(usize),
    /// Places the input at row `i` of a zero tensor.
    Embed(usize),
    /// Stacks the inputs along a new axis 0.
    Stack,
}

/// One vertex of the expression graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    op: Op,
    inputs: Vec<NodeId>,
    shape: Vec<usize>,
}

impl Node {
    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

/// Append-only builder of symbolic computations.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    variables: HashMap<String, NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node behind `id`.
    pub fn node(&self, id: NodeId) -> Result<&Node, NeuroptError> {
        self.nodes.get(id.0).ok_or(NeuroptError::UnknownNode(id.0))
    }

    /// Returns the static shape of `id`.
    pub fn shape(&self, id: NodeId) -> Result<&[usize], NeuroptError> {
        Ok(self.node(id)?.shape())
    }

    /// Looks a variable up by name.
    pub fn variable_by_name(&self, name: &str) -> Option<NodeId> {
        self.variables.get(name).copied()
    }

    fn push(&mut self, op: Op, inputs: Vec<NodeId>, shape: Vec<usize>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { op, inputs, shape });
        id
    }

    // --- Leaves ---

    /// Adds a constant node.
    pub fn constant(&mut self, value: Tensor) -> NodeId {
        let shape = value.shape().to_vec();
        self.push(Op::Constant(value), Vec::new(), shape)
    }

    /// Adds a rank-0 constant.
    pub fn scalar(&mut self, value: f64) -> NodeId {
        self.constant(tensor::scalar(value))
    }

    /// Declares a named variable of fixed shape.
    ///
    /// # Errors
    /// Returns `DuplicateVariable` if the name is already declared.
    pub fn variable(&mut self, name: impl Into<String>, shape: Vec<usize>) -> Result<NodeId, NeuroptError> {
        let name = name.into();
        if self.variables.contains_key(&name) {
            return Err(NeuroptError::DuplicateVariable(name));
        }
        let id = self.push(Op::Variable(name.clone()), Vec::new(), shape);
        self.variables.insert(name, id);
        Ok(id)
    }

    // --- Element-wise ---

    pub fn unary(&mut self, op: UnaryOp, x: NodeId) -> Result<NodeId, NeuroptError> {
        let shape = self.shape(x)?.to_vec();
        Ok(self.push(Op::Unary(op), vec![x], shape))
    }

    pub fn binary(&mut self, op: BinaryOp, a: NodeId, b: NodeId) -> Result<NodeId, NeuroptError> {
        let a_shape = self.shape(a)?;
        let b_shape = self.shape(b)?;
        if a_shape != b_shape {
            return Err(NeuroptError::IncompatibleShapes {
                shape1: a_shape.to_vec(),
                shape2: b_shape.to_vec(),
                operation: op.name().to_string(),
            });
        }
        let shape = a_shape.to_vec();
        Ok(self.push(Op::Binary(op), vec![a, b], shape))
    }

    pub fn add(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, NeuroptError> {
        self.binary(BinaryOp::Add, a, b)
    }

    pub fn sub(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, NeuroptError> {
        self.binary(BinaryOp::Sub, a, b)
    }

    pub fn mul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, NeuroptError> {
        self.binary(BinaryOp::Mul, a, b)
    }

    pub fn div(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, NeuroptError> {
        self.binary(BinaryOp::Div, a, b)
    }

    pub fn neg(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Neg, x)
    }

    pub fn exp(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Exp, x)
    }

    pub fn ln(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Ln, x)
    }

    pub fn tanh(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Tanh, x)
    }

    pub fn sigmoid(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Sigmoid, x)
    }

    pub fn square(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Square, x)
    }

    pub fn sqrt(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Sqrt, x)
    }

    pub fn abs(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.unary(UnaryOp::Abs, x)
    }

    // --- Linear algebra ---

    /// `[M, K] x [K, N] -> [M, N]`.
    pub fn matmul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, NeuroptError> {
        let a_shape = self.shape(a)?;
        let b_shape = self.shape(b)?;
        match (a_shape, b_shape) {
            ([m, k], [k2, n]) if k == k2 => {
                let shape = vec![*m, *n];
                Ok(self.push(Op::MatMul, vec![a, b], shape))
            }
            _ => Err(NeuroptError::IncompatibleShapes {
                shape1: a_shape.to_vec(),
                shape2: b_shape.to_vec(),
                operation: "matmul".to_string(),
            }),
        }
    }

    pub fn transpose(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        match self.shape(x)? {
            [m, n] => {
                let shape = vec![*n, *m];
                Ok(self.push(Op::Transpose, vec![x], shape))
            }
            other => Err(NeuroptError::ShapeMismatch {
                expected: vec![0, 0],
                actual: other.to_vec(),
                operation: "transpose (expects a 2-D tensor)".to_string(),
            }),
        }
    }

    /// Dense inverse of a square matrix. Singularity is only detected at run time.
    pub fn inverse(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        match self.shape(x)? {
            [m, n] if m == n => {
                let shape = vec![*m, *n];
                Ok(self.push(Op::Inverse, vec![x], shape))
            }
            other => {
                let side = other.first().copied().unwrap_or(0);
                Err(NeuroptError::ShapeMismatch {
                    expected: vec![side, side],
                    actual: other.to_vec(),
                    operation: "inverse".to_string(),
                })
            }
        }
    }

    // --- Shape ---

    pub fn reshape(&mut self, x: NodeId, shape: Vec<usize>) -> Result<NodeId, NeuroptError> {
        let current = self.shape(x)?;
        if current == shape.as_slice() {
            return Ok(x);
        }
        if current.iter().product::<usize>() != shape.iter().product::<usize>() {
            return Err(NeuroptError::ShapeMismatch {
                expected: current.to_vec(),
                actual: shape,
                operation: "reshape".to_string(),
            });
        }
        Ok(self.push(Op::Reshape, vec![x], shape))
    }

    /// Reshapes to one dimension.
    pub fn flatten(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        let numel = self.shape(x)?.iter().product();
        self.reshape(x, vec![numel])
    }

    pub fn broadcast_to(&mut self, x: NodeId, shape: Vec<usize>) -> Result<NodeId, NeuroptError> {
        let current = self.shape(x)?;
        if current == shape.as_slice() {
            return Ok(x);
        }
        if !can_broadcast(current, &shape) {
            return Err(NeuroptError::BroadcastError {
                from: current.to_vec(),
                to: shape,
            });
        }
        Ok(self.push(Op::BroadcastTo, vec![x], shape))
    }

    pub fn sum_to(&mut self, x: NodeId, shape: Vec<usize>) -> Result<NodeId, NeuroptError> {
        let current = self.shape(x)?;
        if current == shape.as_slice() {
            return Ok(x);
        }
        if !can_broadcast(&shape, current) {
            return Err(NeuroptError::BroadcastError {
                from: shape,
                to: current.to_vec(),
            });
        }
        Ok(self.push(Op::SumTo, vec![x], shape))
    }

    // --- Reductions ---

    /// Sums every element into a scalar.
    pub fn sum(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        self.check(x)?;
        Ok(self.push(Op::Sum, vec![x], Vec::new()))
    }

    /// Mean of every element, as a scalar.
    pub fn mean(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        let numel: usize = self.shape(x)?.iter().product();
        if numel == 0 {
            return Err(NeuroptError::UnsupportedOperation("mean of an empty tensor".to_string()));
        }
        let total = self.sum(x)?;
        self.scale(total, 1.0 / numel as f64)
    }

    // --- Rows ---

    pub fn select(&mut self, x: NodeId, index: usize) -> Result<NodeId, NeuroptError> {
        let shape = self.shape(x)?;
        match shape.split_first() {
            Some((&rows, rest)) if index < rows => {
                let rest = rest.to_vec();
                Ok(self.push(Op::Select(index), vec![x], rest))
            }
            Some(_) => Err(NeuroptError::IndexOutOfBounds {
                index,
                shape: shape.to_vec(),
            }),
            None => Err(NeuroptError::UnsupportedOperation("select on a rank-0 node".to_string())),
        }
    }

    pub fn embed(&mut self, x: NodeId, index: usize, rows: usize) -> Result<NodeId, NeuroptError> {
        let mut shape = vec![rows];
        shape.extend_from_slice(self.shape(x)?);
        if index >= rows {
            return Err(NeuroptError::IndexOutOfBounds { index, shape });
        }
        Ok(self.push(Op::Embed(index), vec![x], shape))
    }

    pub fn stack(&mut self, items: &[NodeId]) -> Result<NodeId, NeuroptError> {
        let first = *items.first().ok_or(NeuroptError::EmptyTensorList)?;
        let row_shape = self.shape(first)?.to_vec();
        for &item in items {
            let shape = self.shape(item)?;
            if shape != row_shape.as_slice() {
                return Err(NeuroptError::ShapeMismatch {
                    expected: row_shape,
                    actual: shape.to_vec(),
                    operation: "stack".to_string(),
                });
            }
        }
        let mut shape = vec![items.len()];
        shape.extend_from_slice(&row_shape);
        Ok(self.push(Op::Stack, items.to_vec(), shape))
    }

    /// Element at flat position `index`, as a scalar.
    pub fn element(&mut self, x: NodeId, index: usize) -> Result<NodeId, NeuroptError> {
        let flat = self.flatten(x)?;
        self.select(flat, index)
    }

    /// Builds `f(graph, i)` for every `i` in `0..n` and stacks the results.
    ///
    /// This is the batched form of a parameterized computation over an index
    /// range. Every result must have the same shape.
    pub fn map_range<F>(&mut self, n: usize, mut f: F) -> Result<NodeId, NeuroptError>
    where
        F: FnMut(&mut Graph, usize) -> Result<NodeId, NeuroptError>,
    {
        let mut items = Vec::with_capacity(n);
        for i in 0..n {
            items.push(f(self, i)?);
        }
        self.stack(&items)
    }

    // --- Helpers ---

    /// Multiplies every element by a constant.
    pub fn scale(&mut self, x: NodeId, factor: f64) -> Result<NodeId, NeuroptError> {
        let shape = self.shape(x)?.to_vec();
        let c = self.constant(tensor::full(&shape, factor));
        self.mul(c, x)
    }

    /// `n x n` identity constant.
    pub fn eye(&mut self, n: usize) -> NodeId {
        self.constant(tensor::eye(n))
    }

    pub fn zeros_like(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        let shape = self.shape(x)?.to_vec();
        Ok(self.constant(tensor::zeros(&shape)))
    }

    pub fn ones_like(&mut self, x: NodeId) -> Result<NodeId, NeuroptError> {
        let shape = self.shape(x)?.to_vec();
        Ok(self.constant(tensor::ones(&shape)))
    }

    fn check(&self, id: NodeId) -> Result<(), NeuroptError> {
        self.node(id).map(|_| ())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
