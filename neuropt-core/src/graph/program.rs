use crate::autograd::graph::build_topo;
use crate::error::NeuroptError;
use crate::graph::{Graph, NodeId, Op};
use crate::nn::Parameter;
use crate::ops::{elementwise, linalg, reduction, view};
use crate::tensor::Tensor;
use std::collections::{HashMap, HashSet};

/// Values bound to input variables for one execution.
pub type Feed = HashMap<String, Tensor>;

/// A pending assignment `target <- value`.
///
/// `target` must be a variable node; `value` is any node of the same shape.
/// Updates are applied only after the whole program has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub target: NodeId,
    pub value: NodeId,
}

impl Update {
    pub fn new(target: NodeId, value: NodeId) -> Self {
        Update { target, value }
    }
}

/// Current values of the parameters, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    values: HashMap<String, Tensor>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the initial value of every parameter.
    pub fn from_parameters<'a>(parameters: impl IntoIterator<Item = &'a Parameter>) -> Self {
        let mut store = Self::new();
        for parameter in parameters {
            store.insert(parameter.name(), parameter.initial_value().clone());
        }
        store
    }

    /// Sets the value of a parameter, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: Tensor) -> Option<Tensor> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Tensor)> {
        self.values.iter()
    }
}

/// One scheduled node: its operation, the slots holding its inputs and its shape.
#[derive(Debug, Clone)]
struct Instruction {
    op: Op,
    args: Vec<usize>,
    shape: Vec<usize>,
}

/// A compiled, repeatedly executable computation.
///
/// Compilation keeps only the nodes reachable from the requested outputs and
/// update values, in topological order, with inputs resolved to dense slots.
/// The graph itself is no longer needed afterwards.
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    outputs: Vec<usize>,
    updates: Vec<(String, usize)>,
}

impl Program {
    /// Compiles `outputs` and `updates` of `graph` into a program.
    ///
    /// # Errors
    /// * `UnknownNode` for ids that do not belong to `graph`.
    /// * `UnsupportedOperation` if an update targets a non-variable node or
    ///   the same variable twice.
    /// * `ShapeMismatch` if an update value does not have the target's shape.
    pub fn compile(graph: &Graph, outputs: &[NodeId], updates: &[Update]) -> Result<Self, NeuroptError> {
        let mut targets = HashSet::new();
        let mut update_names = Vec::with_capacity(updates.len());
        for update in updates {
            let target = graph.node(update.target)?;
            let name = match target.op() {
                Op::Variable(name) => name.clone(),
                other => {
                    return Err(NeuroptError::UnsupportedOperation(format!(
                        "update target {} is not a variable but {:?}",
                        update.target, other
                    )))
                }
            };
            let value_shape = graph.shape(update.value)?;
            if value_shape != target.shape() {
                return Err(NeuroptError::ShapeMismatch {
                    expected: target.shape().to_vec(),
                    actual: value_shape.to_vec(),
                    operation: format!("update of '{}'", name),
                });
            }
            if !targets.insert(update.target) {
                return Err(NeuroptError::UnsupportedOperation(format!(
                    "variable '{}' is updated more than once",
                    name
                )));
            }
            update_names.push(name);
        }

        let roots: Vec<NodeId> = outputs
            .iter()
            .copied()
            .chain(updates.iter().map(|u| u.value))
            .collect();
        let order = build_topo(graph, &roots)?;

        let mut slots: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());
        let mut instructions = Vec::with_capacity(order.len());
        for id in order {
            let node = graph.node(id)?;
            let args = node
                .inputs()
                .iter()
                .map(|input| {
                    slots.get(input).copied().ok_or_else(|| {
                        NeuroptError::InternalError(format!("input {} of {} scheduled after its consumer", input, id))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            slots.insert(id, instructions.len());
            instructions.push(Instruction {
                op: node.op().clone(),
                args,
                shape: node.shape().to_vec(),
            });
        }

        let slot_of = |id: &NodeId| {
            slots
                .get(id)
                .copied()
                .ok_or_else(|| NeuroptError::InternalError(format!("node {} was not scheduled", id)))
        };
        let outputs = outputs.iter().map(slot_of).collect::<Result<Vec<_>, _>>()?;
        let updates = update_names
            .into_iter()
            .zip(updates.iter())
            .map(|(name, u)| slot_of(&u.value).map(|slot| (name, slot)))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Compiled program: {} of {} graph nodes scheduled, {} outputs, {} updates",
            instructions.len(),
            graph.len(),
            outputs.len(),
            updates.len()
        );

        Ok(Program {
            instructions,
            outputs,
            updates,
        })
    }

    /// Number of scheduled nodes.
    pub fn num_instructions(&self) -> usize {
        self.instructions.len()
    }

    /// Names of the variables this program assigns, in update order.
    pub fn updated_variables(&self) -> impl Iterator<Item = &str> {
        self.updates.iter().map(|(name, _)| name.as_str())
    }

    /// Evaluates the outputs without applying any update.
    pub fn evaluate(&self, store: &ParameterStore, feed: &Feed) -> Result<Vec<Tensor>, NeuroptError> {
        let values = self.execute(store, feed)?;
        Ok(self.outputs.iter().map(|&slot| values[slot].clone()).collect())
    }

    /// Executes one step: evaluates every output and update value, then
    /// assigns all updates at once.
    ///
    /// On error the store is left untouched.
    pub fn run(&self, store: &mut ParameterStore, feed: &Feed) -> Result<Vec<Tensor>, NeuroptError> {
        let values = self.execute(store, feed)?;
        let outputs = self.outputs.iter().map(|&slot| values[slot].clone()).collect();
        for (name, slot) in &self.updates {
            store.insert(name.clone(), values[*slot].clone());
        }
        log::trace!("Program step applied {} updates", self.updates.len());
        Ok(outputs)
    }

    fn execute(&self, store: &ParameterStore, feed: &Feed) -> Result<Vec<Tensor>, NeuroptError> {
        let mut values: Vec<Tensor> = Vec::with_capacity(self.instructions.len());
        for instruction in &self.instructions {
            let value = Self::execute_one(instruction, &values, store, feed)?;
            values.push(value);
        }
        Ok(values)
    }

    fn execute_one(
        instruction: &Instruction,
        values: &[Tensor],
        store: &ParameterStore,
        feed: &Feed,
    ) -> Result<Tensor, NeuroptError> {
        let arg = |i: usize| &values[instruction.args[i]];
        let shape = &instruction.shape;
        match &instruction.op {
            Op::Constant(value) => Ok(value.clone()),
            Op::Variable(name) => {
                let value = feed
                    .get(name)
                    .or_else(|| store.get(name))
                    .ok_or_else(|| NeuroptError::UnboundVariable(name.clone()))?;
                if value.shape() != shape.as_slice() {
                    return Err(NeuroptError::ShapeMismatch {
                        expected: shape.clone(),
                        actual: value.shape().to_vec(),
                        operation: format!("binding of '{}'", name),
                    });
                }
                Ok(value.clone())
            }
            Op::Unary(op) => Ok(elementwise::unary_op(*op, arg(0))),
            Op::Binary(op) => elementwise::binary_op(*op, arg(0), arg(1)),
            Op::MatMul => linalg::matmul(arg(0), arg(1)),
            Op::Transpose => linalg::transpose(arg(0)),
            Op::Inverse => linalg::inverse(arg(0)),
            Op::Reshape => arg(0).reshape(shape.clone()),
            Op::BroadcastTo => arg(0).broadcast_to(shape),
            Op::SumTo => reduction::sum_to(arg(0), shape),
            Op::Sum => Ok(reduction::sum_all(arg(0))),
            Op::Select(index) => view::select(arg(0), *index),
            Op::Embed(index) => view::embed(arg(0), *index, shape[0]),
            Op::Stack => {
                let rows: Vec<&Tensor> = instruction.args.iter().map(|&slot| &values[slot]).collect();
                view::stack(&rows)
            }
        }
    }
}

#[cfg(test)]
#[path = "program_test.rs"]
mod tests;
