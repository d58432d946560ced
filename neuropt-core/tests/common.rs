use neuropt_core::tensor::Tensor;

// Helper function to create a tensor for testing.
// Added allow(dead_code) because usage across different test crates isn't detected easily.
#[allow(dead_code)]
pub(crate) fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub(crate) fn assert_tensor_close(actual: &Tensor, expected: &[f64], epsilon: f64) {
    assert_eq!(actual.numel(), expected.len(), "element count differs");
    for (i, (a, e)) in actual.data().iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= epsilon,
            "element {} differs: {} vs {} (epsilon {})",
            i,
            a,
            e,
            epsilon
        );
    }
}
