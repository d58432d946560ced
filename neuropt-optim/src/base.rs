//! Options shared by the gradient descent family and the compiled training
//! step every update rule runs through.

use crate::UpdateRule;
use log::{debug, info, trace, warn};
use neuropt_core::config::{registered, OptionSet, Property, PropertyKind};
use neuropt_core::graph::program::Feed;
use neuropt_core::graph::{Graph, NodeId, ParameterStore, Program};
use neuropt_core::nn::Parameter;
use neuropt_core::NeuroptError;
use std::sync::OnceLock;

/// Default step size of rules supporting step selection.
pub const DEFAULT_STEP: f64 = 0.1;

/// Options every optimizer has: `verbose`.
pub fn base_options() -> Result<&'static OptionSet, NeuroptError> {
    static OPTIONS: OnceLock<Result<OptionSet, NeuroptError>> = OnceLock::new();
    registered(&OPTIONS, || {
        OptionSet::builder("BaseOptimizer")
            .declare("verbose", Property::new(PropertyKind::Bool).default(false))
            .build()
    })
}

/// Options of rules with a step size: `step`, a float `>= 0`.
pub fn step_selection_options() -> Result<&'static OptionSet, NeuroptError> {
    static OPTIONS: OnceLock<Result<OptionSet, NeuroptError>> = OnceLock::new();
    registered(&OPTIONS, || {
        OptionSet::builder("StepSelection")
            .declare(
                "step",
                Property::bounded(PropertyKind::Float).minval(0.0).default(DEFAULT_STEP),
            )
            .build()
    })
}

/// One compiled training step: evaluates the loss and replaces every
/// parameter with the value its update rule computes.
///
/// The program is built once; [`TrainStep::run`] only executes it.
#[derive(Debug, Clone)]
pub struct TrainStep {
    program: Program,
    step: Option<f64>,
    verbose: bool,
    iterations: usize,
}

impl TrainStep {
    /// Collects the updates of every parameter and compiles them together
    /// with `loss` into one program.
    ///
    /// # Errors
    /// * `NonScalarOutput` if `loss` has more than one element.
    /// * Any error raised while `rule` builds its updates or while compiling.
    pub fn build(
        graph: &mut Graph,
        loss: NodeId,
        parameters: &[&Parameter],
        rule: &dyn UpdateRule,
    ) -> Result<Self, NeuroptError> {
        let loss_shape = graph.shape(loss)?;
        if loss_shape.iter().product::<usize>() != 1 {
            return Err(NeuroptError::NonScalarOutput {
                shape: loss_shape.to_vec(),
            });
        }
        if parameters.is_empty() {
            warn!("Training step built without parameters, it will only evaluate the loss");
        }

        let mut updates = Vec::new();
        for parameter in parameters {
            let parameter_updates = rule.init_param_updates(graph, loss, parameter)?;
            debug!(
                "Parameter '{}' {:?}: {} update(s)",
                parameter.name(),
                parameter.shape(),
                parameter_updates.len()
            );
            updates.extend(parameter_updates);
        }

        let program = Program::compile(graph, &[loss], &updates)?;
        let step = rule.as_step_selection().map(|s| s.step());
        Ok(TrainStep {
            program,
            step,
            verbose: rule.verbose(),
            iterations: 0,
        })
    }

    /// Executes one step and returns the loss computed before the update.
    ///
    /// On error the store is left unchanged.
    pub fn run(&mut self, store: &mut ParameterStore, feed: &Feed) -> Result<f64, NeuroptError> {
        let outputs = self.program.run(store, feed)?;
        let loss = outputs
            .first()
            .ok_or_else(|| NeuroptError::InternalError("training step produced no loss".to_string()))?
            .item()?;
        self.iterations += 1;
        if self.verbose {
            info!("iteration {}: loss = {:.6}", self.iterations, loss);
        } else {
            trace!("iteration {}: loss = {:.6}", self.iterations, loss);
        }
        Ok(loss)
    }

    /// The rule's step size, if it supports step selection.
    pub fn step_size(&self) -> Option<f64> {
        self.step
    }

    /// Number of steps executed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

#[cfg(test)]
#[path = "base_test.rs"]
mod tests;
