use super::*;
use crate::TrainStep;
use approx::assert_relative_eq;
use neuropt_core::graph::program::Feed;
use neuropt_core::tensor::{self, Tensor};
use neuropt_core::ParameterStore;

/// Builds `loss = Σ w ⊙ p²` for a parameter `p` with the shape of `w`.
fn weighted_square_loss(graph: &mut Graph, p: &Parameter, w: Tensor) -> NodeId {
    let weights = graph.constant(w);
    let sq = graph.square(p.node()).unwrap();
    let weighted = graph.mul(weights, sq).unwrap();
    graph.sum(weighted).unwrap()
}

fn one_step(rule: &Hessian, graph: &mut Graph, loss: NodeId, p: &Parameter) -> ParameterStore {
    let mut step = TrainStep::build(graph, loss, &[p], rule).unwrap();
    let mut store = ParameterStore::from_parameters([p]);
    step.run(&mut store, &Feed::new()).unwrap();
    store
}

#[test]
fn test_options_have_no_step() {
    let options = Hessian::options().unwrap();
    assert_eq!(options.names(), vec!["inv_penalty_const", "verbose"]);
    assert!(!options.contains("step"));
}

#[test]
fn test_configuration() {
    let default = Hessian::new(Vec::<(&str, f64)>::new()).unwrap();
    assert_eq!(default, Hessian::default());
    assert_eq!(default.inv_penalty_const(), 1.0);

    assert!(matches!(
        Hessian::new([("inv_penalty_const", -1.0)]),
        Err(NeuroptError::BoundViolation { .. })
    ));
    let unregularized = Hessian::new([("inv_penalty_const", 0.0)]).unwrap();
    assert_eq!(unregularized.inv_penalty_const(), 0.0);

    assert!(matches!(
        Hessian::new([("inv_penalty_const", f64::INFINITY)]),
        Err(NeuroptError::InvalidOptionValue { .. })
    ));

    match Hessian::new([("step", 0.1)]) {
        Err(NeuroptError::InvalidOption { option, available, .. }) => {
            assert_eq!(option, "step");
            assert!(!available.contains(&"step".to_string()));
        }
        other => panic!("expected InvalidOption, got {:?}", other),
    }
}

#[test]
fn test_does_not_support_step_selection() {
    let rule = Hessian::default();
    assert!(rule.as_step_selection().is_none());

    let mut graph = Graph::new();
    let p = Parameter::new(&mut graph, "p", tensor::ones(&[2])).unwrap();
    let loss = weighted_square_loss(&mut graph, &p, tensor::ones(&[2]));
    let step = TrainStep::build(&mut graph, loss, &[&p], &rule).unwrap();
    assert_eq!(step.step_size(), None);
}

#[test]
fn test_regularized_newton_step_on_diagonal_hessian() {
    // H = diag(2w), so update_i = ∇_i / (2 w_i + λ).
    let mut graph = Graph::new();
    let p = Parameter::new(&mut graph, "p", tensor::ones(&[3])).unwrap();
    let loss = weighted_square_loss(&mut graph, &p, Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap());
    let store = one_step(&Hessian::default(), &mut graph, loss, &p);

    let updated = store.get("p").unwrap();
    assert_eq!(updated.shape(), &[3]);
    let gradient = [2.0, 4.0, 6.0];
    let denominators = [3.0, 5.0, 7.0];
    for i in 0..3 {
        assert_relative_eq!(
            updated.data()[i],
            1.0 - gradient[i] / denominators[i],
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_update_keeps_matrix_shape() {
    let mut graph = Graph::new();
    let p = Parameter::new(&mut graph, "p", Tensor::new(vec![1.0, -1.0, 2.0, 0.5], vec![2, 2]).unwrap()).unwrap();
    let w = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let loss = weighted_square_loss(&mut graph, &p, w.clone());
    let store = one_step(&Hessian::default(), &mut graph, loss, &p);

    let updated = store.get("p").unwrap();
    assert_eq!(updated.shape(), &[2, 2]);
    for i in 0..4 {
        let (pi, wi) = (p.initial_value().data()[i], w.data()[i]);
        let expected = pi - 2.0 * wi * pi / (2.0 * wi + 1.0);
        assert_relative_eq!(updated.data()[i], expected, epsilon = 1e-12);
    }
}

#[test]
fn test_unregularized_step_solves_quadratic() {
    // loss = ½ pᵀAp - bᵀp is minimized at A⁻¹b in a single Newton step.
    let mut graph = Graph::new();
    let p = Parameter::new(&mut graph, "p", tensor::zeros(&[2])).unwrap();
    let a = graph.constant(Tensor::new(vec![3.0, 1.0, 1.0, 2.0], vec![2, 2]).unwrap());
    let b = graph.constant(Tensor::new(vec![1.0, 1.0], vec![2, 1]).unwrap());
    let col = graph.reshape(p.node(), vec![2, 1]).unwrap();
    let row = graph.transpose(col).unwrap();
    let ap = graph.matmul(a, col).unwrap();
    let quad = graph.matmul(row, ap).unwrap();
    let half_quad = graph.scale(quad, 0.5).unwrap();
    let bt = graph.transpose(b).unwrap();
    let linear = graph.matmul(bt, col).unwrap();
    let objective = graph.sub(half_quad, linear).unwrap();
    let loss = graph.sum(objective).unwrap();

    let rule = Hessian::new([("inv_penalty_const", 0.0)]).unwrap();
    let store = one_step(&rule, &mut graph, loss, &p);
    let updated = store.get("p").unwrap();
    // A⁻¹ = [[2, -1], [-1, 3]] / 5
    assert_relative_eq!(updated.data()[0], 0.2, epsilon = 1e-12);
    assert_relative_eq!(updated.data()[1], 0.4, epsilon = 1e-12);
}

#[test]
fn test_scalar_parameter() {
    let mut graph = Graph::new();
    let p = Parameter::new(&mut graph, "p", tensor::scalar(2.0)).unwrap();
    let loss = weighted_square_loss(&mut graph, &p, tensor::scalar(1.5));
    let store = one_step(&Hessian::default(), &mut graph, loss, &p);
    let updated = store.get("p").unwrap();
    assert_eq!(updated.shape(), &[] as &[usize]);
    // ∇ = 3p = 6, H = 3, update = 6 / 4
    assert_relative_eq!(updated.item().unwrap(), 0.5, epsilon = 1e-12);
}

#[test]
fn test_empty_parameter_gets_no_update() {
    let mut graph = Graph::new();
    let empty = Parameter::new(&mut graph, "empty", tensor::zeros(&[0])).unwrap();
    let p = Parameter::new(&mut graph, "p", tensor::ones(&[2])).unwrap();
    let loss = weighted_square_loss(&mut graph, &p, tensor::ones(&[2]));

    let rule = Hessian::default();
    assert_eq!(rule.init_param_updates(&mut graph, loss, &empty).unwrap(), Vec::new());
    let mut step = TrainStep::build(&mut graph, loss, &[&empty, &p], &rule).unwrap();
    assert_eq!(step.program().updated_variables().collect::<Vec<_>>(), vec!["p"]);

    let mut store = ParameterStore::from_parameters([&empty, &p]);
    step.run(&mut store, &Feed::new()).unwrap();
    assert_eq!(store.get("empty"), Some(empty.initial_value()));
    // ∇ = 2p = 2, H = 2I, update = 2 / 3
    for value in store.get("p").unwrap().data() {
        assert_relative_eq!(*value, 1.0 / 3.0, epsilon = 1e-12);
    }
}

#[test]
fn test_singular_hessian_is_reported() {
    // A linear loss has a zero Hessian; without penalty it cannot be inverted.
    let mut graph = Graph::new();
    let p = Parameter::new(&mut graph, "p", tensor::ones(&[3])).unwrap();
    let w = graph.constant(Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap());
    let weighted = graph.mul(w, p.node()).unwrap();
    let loss = graph.sum(weighted).unwrap();

    let rule = Hessian::new([("inv_penalty_const", 0.0)]).unwrap();
    let mut step = TrainStep::build(&mut graph, loss, &[&p], &rule).unwrap();
    let mut store = ParameterStore::from_parameters([&p]);
    assert_eq!(
        step.run(&mut store, &Feed::new()),
        Err(NeuroptError::SingularMatrix { size: 3 })
    );
    assert_eq!(store.get("p"), Some(p.initial_value()));
    assert_eq!(step.iterations(), 0);
}
