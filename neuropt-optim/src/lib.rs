use neuropt_core::graph::{Graph, NodeId, Update};
use neuropt_core::nn::Parameter;
use neuropt_core::NeuroptError;

// Define modules for optimizers
pub mod base;
pub mod hessian;
pub mod hessian_diagonal;
pub mod sgd;

pub use base::TrainStep;
pub use hessian::Hessian;
pub use hessian_diagonal::HessianDiagonal;
pub use sgd::GradientDescent;

/// Trait for optimization algorithms expressed as symbolic update rules.
///
/// An update rule does not touch parameter values. For every trainable
/// parameter it emits, once, the graph expression of the parameter's next
/// value; [`TrainStep`] compiles these expressions and applies them at every
/// training step.
///
/// `init_param_updates` has no default, so a rule that forgets it does not
/// compile:
///
/// ```compile_fail
/// use neuropt_optim::UpdateRule;
///
/// struct Lazy;
///
/// impl UpdateRule for Lazy {}
/// ```
pub trait UpdateRule {
    /// Builds the updates of `parameter` minimizing the scalar `loss`.
    ///
    /// # Arguments
    /// * `graph` - The graph holding `loss`; new nodes are appended to it.
    /// * `loss` - A single-element node depending on `parameter`.
    /// * `parameter` - The trainable parameter to update.
    fn init_param_updates(
        &self,
        graph: &mut Graph,
        loss: NodeId,
        parameter: &Parameter,
    ) -> Result<Vec<Update>, NeuroptError>;

    /// Returns the step-selection capability if the rule has one.
    fn as_step_selection(&self) -> Option<&dyn SupportsStepSelection> {
        None
    }

    /// Whether the loss of every step should be logged at `info` level.
    fn verbose(&self) -> bool {
        false
    }
}

/// Capability of rules whose update is scaled by a configurable step size.
pub trait SupportsStepSelection {
    fn step(&self) -> f64;
}
