use super::*;
use crate::TrainStep;
use approx::assert_relative_eq;
use neuropt_core::graph::program::Feed;
use neuropt_core::tensor::Tensor;
use neuropt_core::ParameterStore;

fn run_once(rule: &HessianDiagonal, weights: Vec<f64>, start: Vec<f64>) -> Tensor {
    let n = weights.len();
    let mut graph = Graph::new();
    let p = Parameter::new(&mut graph, "p", Tensor::new(start, vec![n]).unwrap()).unwrap();
    let w = graph.constant(Tensor::new(weights, vec![n]).unwrap());
    let sq = graph.square(p.node()).unwrap();
    let weighted = graph.mul(w, sq).unwrap();
    let loss = graph.sum(weighted).unwrap();

    let mut step = TrainStep::build(&mut graph, loss, &[&p], rule).unwrap();
    let mut store = ParameterStore::from_parameters([&p]);
    step.run(&mut store, &Feed::new()).unwrap();
    store.get("p").unwrap().clone()
}

#[test]
fn test_options() {
    let options = HessianDiagonal::options().unwrap();
    assert_eq!(options.names(), vec!["min_eigval", "step", "verbose"]);

    let default = HessianDiagonal::new(Vec::<(&str, f64)>::new()).unwrap();
    assert_eq!(default, HessianDiagonal::default());
    assert_relative_eq!(default.min_eigval(), 1e-2);
    assert_relative_eq!(default.step(), 0.1);

    assert!(matches!(
        HessianDiagonal::new([("min_eigval", 1.5)]),
        Err(NeuroptError::BoundViolation { .. })
    ));
    assert!(matches!(
        HessianDiagonal::new([("step", -0.1)]),
        Err(NeuroptError::BoundViolation { .. })
    ));
    assert!(matches!(
        HessianDiagonal::new([("inv_penalty_const", 1.0)]),
        Err(NeuroptError::InvalidOption { .. })
    ));
}

#[test]
fn test_supports_step_selection() {
    let rule = HessianDiagonal::new([("step", 0.5)]).unwrap();
    let capability = rule.as_step_selection().unwrap();
    assert_relative_eq!(capability.step(), 0.5);
}

#[test]
fn test_scales_gradient_by_curvature() {
    // ∇ = 2wp and d = 2w, so every entry moves by step * p.
    let updated = run_once(&HessianDiagonal::default(), vec![1.0, 2.0, 3.0], vec![1.0, -2.0, 0.5]);
    let expected = [0.9, -1.8, 0.45];
    for (got, want) in updated.data().iter().zip(expected.iter()) {
        assert_relative_eq!(*got, *want, epsilon = 1e-12);
    }
}

#[test]
fn test_small_curvature_is_floored() {
    // d = 0.002 < min_eigval = 0.01 → divide by 0.01 instead.
    let rule = HessianDiagonal::new([("step", 1.0)]).unwrap();
    let updated = run_once(&rule, vec![0.001, 1.0], vec![1.0, 1.0]);
    assert_relative_eq!(updated.data()[0], 1.0 - 0.002 / 0.01, epsilon = 1e-12);
    assert_relative_eq!(updated.data()[1], 0.0, epsilon = 1e-12);
}

#[test]
fn test_negative_curvature_keeps_its_sign() {
    let rule = HessianDiagonal::new([("step", 1.0)]).unwrap();
    let updated = run_once(&rule, vec![-1.0], vec![2.0]);
    // ∇ = -4, d = -2
    assert_relative_eq!(updated.data()[0], 0.0, epsilon = 1e-12);
}
