use crate::base::base_options;
use crate::UpdateRule;
use log::{debug, warn};
use neuropt_core::autograd::grad_one;
use neuropt_core::config::{registered, Config, Configurable, OptionSet, OptionValue, Property, PropertyKind};
use neuropt_core::graph::{Graph, NodeId, Update};
use neuropt_core::nn::Parameter;
use neuropt_core::NeuroptError;
use std::sync::OnceLock;

/// Parameters above this many entries get a warning: the Hessian has
/// `n * n` entries and takes `n` symbolic gradients to build.
pub const LARGE_HESSIAN_WARNING: usize = 1024;

/// Newton's method with a regularized full Hessian.
///
/// For a parameter `P` with `n` entries and gradient `∇` of the loss, every
/// step computes the `n x n` Hessian `H` and applies
///
/// `P <- P - (H + λI)⁻¹ ∇`
///
/// with `λ = inv_penalty_const`. The penalty keeps `H + λI` invertible for
/// most losses. A singular matrix is reported by the step that meets it.
///
/// The update is already scaled by the inverse Hessian, so this rule has no
/// `step` option and does not support step selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Hessian {
    inv_penalty_const: f64,
    verbose: bool,
}

impl Hessian {
    /// Creates a new instance from keyword options
    /// (`inv_penalty_const`, `verbose`).
    pub fn new<I, K, V>(kwargs: I) -> Result<Self, NeuroptError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OptionValue>,
    {
        Self::configure(kwargs)
    }

    pub fn inv_penalty_const(&self) -> f64 {
        self.inv_penalty_const
    }
}

impl Default for Hessian {
    fn default() -> Self {
        Hessian {
            inv_penalty_const: 1.0,
            verbose: false,
        }
    }
}

impl Configurable for Hessian {
    fn options() -> Result<&'static OptionSet, NeuroptError> {
        static OPTIONS: OnceLock<Result<OptionSet, NeuroptError>> = OnceLock::new();
        registered(&OPTIONS, || {
            OptionSet::builder("Hessian")
                .inherit(base_options()?)
                .declare(
                    "inv_penalty_const",
                    Property::bounded(PropertyKind::Float).minval(0.0).default(1.0),
                )
                .build()
        })
    }

    fn from_config(config: Config) -> Result<Self, NeuroptError> {
        let inv_penalty_const = config.get_float("inv_penalty_const")?;
        if inv_penalty_const == 0.0 {
            warn!("Hessian built with inv_penalty_const = 0, singular Hessians will not be regularized");
        }
        Ok(Hessian {
            inv_penalty_const,
            verbose: config.get_bool("verbose")?,
        })
    }
}

impl UpdateRule for Hessian {
    fn init_param_updates(
        &self,
        graph: &mut Graph,
        loss: NodeId,
        parameter: &Parameter,
    ) -> Result<Vec<Update>, NeuroptError> {
        let p = parameter.node();
        let shape = parameter.shape().to_vec();
        let n = parameter.numel();
        if n == 0 {
            debug!("Parameter '{}' is empty, no Hessian update", parameter.name());
            return Ok(Vec::new());
        }
        if n > LARGE_HESSIAN_WARNING {
            warn!(
                "Parameter '{}' has {} entries, its Hessian has {} entries",
                parameter.name(),
                n,
                n * n
            );
        }

        let gradient = grad_one(graph, loss, p)?;
        let flat_gradient = graph.flatten(gradient)?;
        // Row i is the gradient of the i-th gradient entry.
        let hessian = graph.map_range(n, |graph, i| {
            let entry = graph.element(flat_gradient, i)?;
            let row = grad_one(graph, entry, p)?;
            graph.flatten(row)
        })?;

        let identity = graph.eye(n);
        let penalty = graph.scale(identity, self.inv_penalty_const)?;
        let regularized = graph.add(hessian, penalty)?;
        let hessian_inverse = graph.inverse(regularized)?;

        let gradient_column = graph.reshape(gradient, vec![n, 1])?;
        let direction = graph.matmul(hessian_inverse, gradient_column)?;
        let direction = graph.reshape(direction, shape)?;
        let new_value = graph.sub(p, direction)?;

        debug!(
            "Hessian update for '{}': {}x{} matrix, graph now has {} nodes",
            parameter.name(),
            n,
            n,
            graph.len()
        );
        Ok(vec![Update::new(p, new_value)])
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
#[path = "hessian_test.rs"]
mod tests;
