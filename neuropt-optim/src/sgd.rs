use crate::base::{base_options, step_selection_options, DEFAULT_STEP};
use crate::{SupportsStepSelection, UpdateRule};
use neuropt_core::autograd::grad_one;
use neuropt_core::config::{registered, Config, Configurable, OptionSet, OptionValue};
use neuropt_core::graph::{Graph, NodeId, Update};
use neuropt_core::nn::Parameter;
use neuropt_core::NeuroptError;
use std::sync::OnceLock;

/// Implements plain gradient descent.
///
/// Updates parameters `p` according to the rule:
/// `p = p - step * grad(p)`
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDescent {
    step: f64,
    verbose: bool,
}

impl GradientDescent {
    /// Creates a new instance from keyword options (`step`, `verbose`).
    pub fn new<I, K, V>(kwargs: I) -> Result<Self, NeuroptError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OptionValue>,
    {
        Self::configure(kwargs)
    }
}

impl Default for GradientDescent {
    fn default() -> Self {
        GradientDescent {
            step: DEFAULT_STEP,
            verbose: false,
        }
    }
}

impl Configurable for GradientDescent {
    fn options() -> Result<&'static OptionSet, NeuroptError> {
        static OPTIONS: OnceLock<Result<OptionSet, NeuroptError>> = OnceLock::new();
        registered(&OPTIONS, || {
            OptionSet::builder("GradientDescent")
                .inherit(base_options()?)
                .inherit(step_selection_options()?)
                .build()
        })
    }

    fn from_config(config: Config) -> Result<Self, NeuroptError> {
        Ok(GradientDescent {
            step: config.get_float("step")?,
            verbose: config.get_bool("verbose")?,
        })
    }
}

impl UpdateRule for GradientDescent {
    fn init_param_updates(
        &self,
        graph: &mut Graph,
        loss: NodeId,
        parameter: &Parameter,
    ) -> Result<Vec<Update>, NeuroptError> {
        let p = parameter.node();
        let gradient = grad_one(graph, loss, p)?;
        let scaled = graph.scale(gradient, self.step)?;
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

impl SupportsStepSelection for GradientDescent {
    fn step(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
