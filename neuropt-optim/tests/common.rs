use neuropt_core::graph::program::Feed;
use neuropt_core::nn::Parameter;
use neuropt_core::tensor::Tensor;
use neuropt_core::{Graph, NodeId};

// Helpers shared by the integration tests.
// allow(dead_code): each test crate only uses part of them.

#[allow(dead_code)]
pub(crate) fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

/// A linear model `sigmoid(x·w + b)` and its mean squared error.
#[allow(dead_code)]
pub(crate) struct LinearModel {
    pub w: Parameter,
    pub b: Parameter,
    pub loss: NodeId,
}

#[allow(dead_code)]
pub(crate) fn linear_model(graph: &mut Graph, rows: usize, features: usize, w0: Tensor, sigmoid: bool) -> LinearModel {
    let w = Parameter::new(graph, "w", w0).unwrap();
    let b = Parameter::new(graph, "b", Tensor::new(vec![0.0], vec![1]).unwrap()).unwrap();
    let x = graph.variable("x", vec![rows, features]).unwrap();
    let y = graph.variable("y", vec![rows, 1]).unwrap();
    let xw = graph.matmul(x, w.node()).unwrap();
    let bb = graph.broadcast_to(b.node(), vec![rows, 1]).unwrap();
    let mut pred = graph.add(xw, bb).unwrap();
    if sigmoid {
        pred = graph.sigmoid(pred).unwrap();
    }
    let err = graph.sub(pred, y).unwrap();
    let sq = graph.square(err).unwrap();
    let loss = graph.mean(sq).unwrap();
    LinearModel { w, b, loss }
}

#[allow(dead_code)]
pub(crate) fn feed(x: Tensor, y: Tensor) -> Feed {
    let mut feed = Feed::new();
    feed.insert("x".to_string(), x);
    feed.insert("y".to_string(), y);
    feed
}
