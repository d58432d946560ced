use crate::autograd::grad_one;
use crate::error::NeuroptError;
use crate::graph::program::Feed;
use crate::graph::{Graph, NodeId, Op, ParameterStore, Program};
use crate::tensor::Tensor;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed at element {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Gradient check target {0} must be a variable node")]
    TargetNotVariable(NodeId),
    #[error("Numerical gradient is NaN or infinite at element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite at element {element_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite { element_index: usize, value: f64 },
    #[error("Tensor error during gradient check: {0}")]
    TensorError(NeuroptError),
}

impl From<NeuroptError> for GradCheckError {
    fn from(err: NeuroptError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks the symbolic gradient of the scalar `output` with respect to the
/// variable `wrt` against central finite differences.
///
/// The value of `wrt` is taken from `feed` if bound there, otherwise from
/// `store`. An element passes when
/// `|analytical - numerical| <= tolerance * (1 + |numerical|)`.
pub fn check_grad(
    graph: &mut Graph,
    output: NodeId,
    wrt: NodeId,
    store: &ParameterStore,
    feed: &Feed,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    let name = match graph.node(wrt)?.op() {
        Op::Variable(name) => name.clone(),
        _ => return Err(GradCheckError::TargetNotVariable(wrt)),
    };
    let analytical_node = grad_one(graph, output, wrt)?;
    let analytical_program = Program::compile(graph, &[analytical_node], &[])?;
    let loss_program = Program::compile(graph, &[output], &[])?;

    let analytical = analytical_program
        .evaluate(store, feed)?
        .pop()
        .ok_or_else(|| NeuroptError::InternalError("missing analytical gradient".to_string()))?;

    let in_feed = feed.contains_key(&name);
    let base = if in_feed { feed.get(&name) } else { store.get(&name) }
        .cloned()
        .ok_or_else(|| NeuroptError::UnboundVariable(name.clone()))?;

    let mut store = store.clone();
    let mut feed = feed.clone();
    let mut loss_at = |value: Tensor| -> Result<f64, GradCheckError> {
        if in_feed {
            feed.insert(name.clone(), value);
        } else {
            store.insert(name.clone(), value);
        }
        let out = loss_program.evaluate(&store, &feed)?;
        let loss = out
            .first()
            .ok_or_else(|| NeuroptError::InternalError("missing loss output".to_string()))?
            .item()?;
        Ok(loss)
    };

    for element_index in 0..base.numel() {
        let mut plus = base.data().to_vec();
        plus[element_index] += epsilon;
        let mut minus = base.data().to_vec();
        minus[element_index] -= epsilon;

        let loss_plus = loss_at(Tensor::new(plus, base.shape().to_vec())?)?;
        let loss_minus = loss_at(Tensor::new(minus, base.shape().to_vec())?)?;
        let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
        if !numerical_grad.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                element_index,
                loss_plus,
                loss_minus,
            });
        }

        let analytical_grad = analytical.get(element_index)?;
        if !analytical_grad.is_finite() {
            return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                element_index,
                value: analytical_grad,
            });
        }

        let difference = (analytical_grad - numerical_grad).abs();
        if difference > tolerance * (1.0 + numerical_grad.abs()) {
            return Err(GradCheckError::GradientMismatch {
                element_index,
                analytical_grad,
                numerical_grad,
                difference,
            });
        }
    }
    Ok(())
}
