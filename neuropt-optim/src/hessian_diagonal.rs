use crate::base::{base_options, step_selection_options, DEFAULT_STEP};
use crate::{SupportsStepSelection, UpdateRule};
use neuropt_core::autograd::grad_one;
use neuropt_core::config::{registered, Config, Configurable, OptionSet, OptionValue, Property};
use neuropt_core::graph::{Graph, NodeId, Update};
use neuropt_core::nn::Parameter;
use neuropt_core::ops::UnaryOp;
use neuropt_core::tensor;
use neuropt_core::NeuroptError;
use std::sync::OnceLock;

/// Diagonal approximation of Newton's method.
///
/// Instead of the full Hessian, every entry of the parameter is divided by
/// the matching entry of `d = ∂(Σ∇)/∂P`, which costs one extra gradient:
///
/// `P <- P - step * ∇ / d`
///
/// Entries of `d` whose magnitude is below `min_eigval` are replaced by
/// `min_eigval`.
#[derive(Debug, Clone, PartialEq)]
pub struct HessianDiagonal {
    step: f64,
    min_eigval: f64,
    verbose: bool,
}

impl HessianDiagonal {
    /// Creates a new instance from keyword options
    /// (`step`, `min_eigval`, `verbose`).
    pub fn new<I, K, V>(kwargs: I) -> Result<Self, NeuroptError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OptionValue>,
    {
        Self::configure(kwargs)
    }

    pub fn min_eigval(&self) -> f64 {
        self.min_eigval
    }
}

impl Default for HessianDiagonal {
    fn default() -> Self {
        HessianDiagonal {
            step: DEFAULT_STEP,
            min_eigval: 1e-2,
            verbose: false,
        }
    }
}

impl Configurable for HessianDiagonal {
    fn options() -> Result<&'static OptionSet, NeuroptError> {
        static OPTIONS: OnceLock<Result<OptionSet, NeuroptError>> = OnceLock::new();
        registered(&OPTIONS, || {
            OptionSet::builder("HessianDiagonal")
                .inherit(base_options()?)
                .inherit(step_selection_options()?)
                .declare("min_eigval", Property::proper_fraction().default(1e-2))
                .build()
        })
    }

    fn from_config(config: Config) -> Result<Self, NeuroptError> {
        Ok(HessianDiagonal {
            step: config.get_float("step")?,
            min_eigval: config.get_float("min_eigval")?,
            verbose: config.get_bool("verbose")?,
        })
    }
}

impl UpdateRule for HessianDiagonal {
    fn init_param_updates(
        &self,
        graph: &mut Graph,
        loss: NodeId,
        parameter: &Parameter,
    ) -> Result<Vec<Update>, NeuroptError> {
        let p = parameter.node();
        let gradient = grad_one(graph, loss, p)?;
        let gradient_sum = graph.sum(gradient)?;
        let second = grad_one(graph, gradient_sum, p)?;

        // safe = mask * d + (1 - mask) * min_eigval, mask = |d| >= min_eigval
        let magnitude = graph.abs(second)?;
        let mask = graph.unary(UnaryOp::StepMask(self.min_eigval), magnitude)?;
        let ones = graph.ones_like(mask)?;
        let inverse_mask = graph.sub(ones, mask)?;
        let floor = graph.constant(tensor::full(parameter.shape(), self.min_eigval));
        let kept = graph.mul(mask, second)?;
        let floored = graph.mul(inverse_mask, floor)?;
        let safe = graph.add(kept, floored)?;

        let ratio = graph.div(gradient, safe)?;
        let scaled = graph.scale(ratio, self.step)?;
        let new_value = graph.sub(p, scaled)?;
        Ok(vec![Update::new(p, new_value)])
    }

    fn as_step_selection(&self) -> Option<&dyn SupportsStepSelection> {
        Some(self)
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}

impl SupportsStepSelection for HessianDiagonal {
    fn step(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
#[path = "hessian_diagonal_test.rs"]
mod tests;
