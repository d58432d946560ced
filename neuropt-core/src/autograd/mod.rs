//! Symbolic reverse-mode differentiation.
//!
//! [`grad`] walks the graph backwards from a scalar output and emits, as new
//! nodes of the same graph, the expression of the gradient with respect to
//! each requested node. Since the result is an ordinary graph expression it
//! can be differentiated again, which is how second-order quantities such as
//! Hessians are built.

pub(crate) mod backward_op;
pub mod grad_check;
pub(crate) mod graph;

pub use grad_check::{check_grad, GradCheckError};

use crate::error::NeuroptError;
use crate::graph::{Graph, NodeId};
use std::collections::HashMap;

/// Builds `d output / d w` for every `w` in `wrt`.
///
/// `output` must hold exactly one element. A node of `wrt` that `output` does
/// not depend on gets a zero constant of its own shape.
///
/// # Errors
/// * `NonScalarOutput` if `output` has more than one element.
/// * `UnknownNode` if any id does not belong to `graph`.
pub fn grad(graph: &mut Graph, output: NodeId, wrt: &[NodeId]) -> Result<Vec<NodeId>, NeuroptError> {
    let output_shape = graph.shape(output)?;
    if output_shape.iter().product::<usize>() != 1 {
        return Err(NeuroptError::NonScalarOutput {
            shape: output_shape.to_vec(),
        });
    }
    for &w in wrt {
        graph.node(w)?;
    }

    let order = graph::build_topo(graph, &[output])?;

    // Forward pass: which nodes are influenced by a differentiation target.
    let mut depends = vec![false; graph.len()];
    for &w in wrt {
        depends[w.index()] = true;
    }
    for &id in &order {
        if !depends[id.index()] {
            depends[id.index()] = graph.node(id)?.inputs().iter().any(|i| depends[i.index()]);
        }
    }

    let mut adjoints: HashMap<NodeId, NodeId> = HashMap::new();
    if depends[output.index()] {
        let seed = graph.ones_like(output)?;
        adjoints.insert(output, seed);
    }

    for &id in order.iter().rev() {
        if !depends[id.index()] {
            continue;
        }
        let Some(&grad_output) = adjoints.get(&id) else {
            continue;
        };
        let inputs = graph.node(id)?.inputs().to_vec();
        if inputs.is_empty() {
            continue;
        }
        let needs: Vec<bool> = inputs.iter().map(|i| depends[i.index()]).collect();
        let contributions = backward_op::backward(graph, id, grad_output, &needs)?;
        for ((input, contribution), needed) in inputs.into_iter().zip(contributions).zip(needs) {
            let Some(contribution) = contribution else {
                continue;
            };
            if !needed {
                continue;
            }
            let accumulated = match adjoints.get(&input) {
                Some(&previous) => graph.add(previous, contribution)?,
                None => contribution,
            };
            adjoints.insert(input, accumulated);
        }
    }

    log::trace!(
        "grad: {} nodes on the path, graph now has {} nodes",
        order.len(),
        graph.len()
    );

    wrt.iter()
        .map(|w| match adjoints.get(w) {
            Some(&g) => Ok(g),
            None => graph.zeros_like(*w),
        })
        .collect()
}

/// Convenience wrapper of [`grad`] for a single target.
pub fn grad_one(graph: &mut Graph, output: NodeId, wrt: NodeId) -> Result<NodeId, NeuroptError> {
    let mut grads = grad(graph, output, &[wrt])?;
    grads
        .pop()
        .ok_or_else(|| NeuroptError::InternalError("grad returned no gradient".to_string()))
}

#[cfg(test)]
#[path = "autograd_test.rs"]
mod tests;
