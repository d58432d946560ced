use crate::error::NeuroptError;
use crate::graph::{Graph, NodeId, Op};
use crate::ops::{BinaryOp, UnaryOp};

/// Emits the graph nodes computing the gradient of each input of `node`,
/// given the gradient `grad_output` flowing into the node's output.
///
/// For \( y = f(x_1, ..., x_n) \) this builds
/// \\[ \frac{dL}{dx_i} = \frac{dL}{dy} \cdot \frac{dy}{dx_i} \\]
/// as new nodes of `graph`, so the result is itself differentiable.
///
/// `needs[i]` tells whether input `i` reaches a differentiation target; inputs
/// that don't, and inputs whose contribution is identically zero, get `None`.
/// The returned vector has one entry per input, in input order.
pub(crate) fn backward(
    graph: &mut Graph,
    node: NodeId,
    grad_output: NodeId,
    needs: &[bool],
) -> Result<Vec<Option<NodeId>>, NeuroptError> {
    let (op, inputs) = {
        let n = graph.node(node)?;
        let op = match n.op() {
            // Leaves have nothing to propagate to; skip cloning their value.
            Op::Constant(_) | Op::Variable(_) => return Ok(Vec::new()),
            other => other.clone(),
        };
        (op, n.inputs().to_vec())
    };
    let g = grad_output;
    let input_shape = |graph: &Graph, i: usize| graph.shape(inputs[i]).map(|s| s.to_vec());

    let mut grads: Vec<Option<NodeId>> = vec![None; inputs.len()];
    match op {
        Op::Constant(_) | Op::Variable(_) => {}
        Op::Unary(unary) => {
            if needs[0] {
                grads[0] = unary_backward(graph, unary, node, inputs[0], g)?;
            }
        }
        Op::Binary(binary) => {
            let (a, b) = (inputs[0], inputs[1]);
            match binary {
                BinaryOp::Add => {
                    grads[0] = Some(g);
                    grads[1] = Some(g);
                }
                BinaryOp::Sub => {
                    grads[0] = Some(g);
                    if needs[1] {
                        grads[1] = Some(graph.neg(g)?);
                    }
                }
                BinaryOp::Mul => {
                    if needs[0] {
                        grads[0] = Some(graph.mul(g, b)?);
                    }
                    if needs[1] {
                        grads[1] = Some(graph.mul(g, a)?);
                    }
                }
                BinaryOp::Div => {
                    if needs[0] {
                        grads[0] = Some(graph.div(g, b)?);
                    }
                    if needs[1] {
                        // d(a/b)/db = -a / b²
                        let b_sq = graph.square(b)?;
                        let ga = graph.mul(g, a)?;
                        let q = graph.div(ga, b_sq)?;
                        grads[1] = Some(graph.neg(q)?);
                    }
                }
            }
        }
        Op::MatMul => {
            let (a, b) = (inputs[0], inputs[1]);
            if needs[0] {
                let b_t = graph.transpose(b)?;
                grads[0] = Some(graph.matmul(g, b_t)?);
            }
            if needs[1] {
                let a_t = graph.transpose(a)?;
                grads[1] = Some(graph.matmul(a_t, g)?);
            }
        }
        Op::Transpose => {
            grads[0] = Some(graph.transpose(g)?);
        }
        Op::Inverse => {
            // Y = A⁻¹  =>  dL/dA = -Yᵀ · dL/dY · Yᵀ
            let y_t = graph.transpose(node)?;
            let left = graph.matmul(y_t, g)?;
            let both = graph.matmul(left, y_t)?;
            grads[0] = Some(graph.neg(both)?);
        }
        Op::Reshape => {
            let shape = input_shape(graph, 0)?;
            grads[0] = Some(graph.reshape(g, shape)?);
        }
        Op::BroadcastTo => {
            let shape = input_shape(graph, 0)?;
            grads[0] = Some(graph.sum_to(g, shape)?);
        }
        Op::SumTo | Op::Sum => {
            let shape = input_shape(graph, 0)?;
            grads[0] = Some(graph.broadcast_to(g, shape)?);
        }
        Op::Select(index) => {
            let rows = input_shape(graph, 0)?[0];
            grads[0] = Some(graph.embed(g, index, rows)?);
        }
        Op::Embed(index) => {
            grads[0] = Some(graph.select(g, index)?);
        }
        Op::Stack => {
            for (j, slot) in grads.iter_mut().enumerate() {
                if needs[j] {
                    *slot = Some(graph.select(g, j)?);
                }
            }
        }
    }
    Ok(grads)
}

fn unary_backward(
    graph: &mut Graph,
    op: UnaryOp,
    y: NodeId,
    x: NodeId,
    g: NodeId,
) -> Result<Option<NodeId>, NeuroptError> {
    let grad = match op {
        UnaryOp::Neg => graph.neg(g)?,
        UnaryOp::Exp => graph.mul(g, y)?,
        UnaryOp::Ln => graph.div(g, x)?,
        UnaryOp::Tanh => {
            let one = graph.ones_like(y)?;
            let y_sq = graph.square(y)?;
            let d = graph.sub(one, y_sq)?;
            graph.mul(g, d)?
        }
        UnaryOp::Sigmoid => {
            let one = graph.ones_like(y)?;
            let one_minus = graph.sub(one, y)?;
            let d = graph.mul(y, one_minus)?;
            graph.mul(g, d)?
        }
        UnaryOp::Square => {
            let two_x = graph.scale(x, 2.0)?;
            graph.mul(g, two_x)?
        }
        UnaryOp::Sqrt => {
            let two_y = graph.scale(y, 2.0)?;
            graph.div(g, two_y)?
        }
        UnaryOp::Abs => {
            let sign = graph.unary(UnaryOp::Sign, x)?;
            graph.mul(g, sign)?
        }
        // Piecewise constant: zero derivative almost everywhere.
        UnaryOp::Sign | UnaryOp::StepMask(_) => return Ok(None),
    };
    Ok(Some(grad))
}
