use crate::error::NeuroptError;
use crate::graph::{Graph, NodeId};

/// Collects every node reachable from `roots` in topological order
/// (inputs before consumers).
///
/// Nodes only reference nodes created before them, so sorting the reachable
/// set by id is a valid topological sort; the traversal itself is iterative
/// to stay safe on the deep graphs produced by second-order differentiation.
pub(crate) fn build_topo(graph: &Graph, roots: &[NodeId]) -> Result<Vec<NodeId>, NeuroptError> {
    let mut visited = vec![false; graph.len()];
    let mut stack: Vec<NodeId> = Vec::with_capacity(roots.len());
    for &root in roots {
        graph.node(root)?;
        stack.push(root);
    }
    while let Some(id) = stack.pop() {
        if visited[id.index()] {
            continue;
        }
        visited[id.index()] = true;
        for &input in graph.node(id)?.inputs() {
            if !visited[input.index()] {
                stack.push(input);
            }
        }
    }
    Ok(visited
        .iter()
        .enumerate()
        .filter(|(_, &seen)| seen)
        .map(|(i, _)| NodeId(i))
        .collect())
}
