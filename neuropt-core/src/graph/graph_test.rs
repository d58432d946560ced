use super::*;

#[test]
fn test_node_ids_follow_creation_order() {
    let mut g = Graph::new();
    assert!(g.is_empty());
    let a = g.scalar(1.0);
    let b = g.scalar(2.0);
    let c = g.add(a, b).unwrap();
    assert!(a < b && b < c);
    assert_eq!(g.len(), 3);
    assert_eq!(g.node(c).unwrap().inputs(), &[a, b]);
    assert_eq!(format!("{}", c), "%2");
}

#[test]
fn test_variable_names_are_unique() {
    let mut g = Graph::new();
    let w = g.variable("w", vec![2]).unwrap();
    assert_eq!(g.variable_by_name("w"), Some(w));
    assert_eq!(g.variable_by_name("v"), None);
    assert_eq!(
        g.variable("w", vec![3]),
        Err(NeuroptError::DuplicateVariable("w".to_string()))
    );
}

#[test]
fn test_unknown_node_is_reported() {
    let g = Graph::new();
    assert_eq!(g.shape(NodeId(4)), Err(NeuroptError::UnknownNode(4)));
}

#[test]
fn test_binary_requires_equal_shapes() {
    let mut g = Graph::new();
    let a = g.variable("a", vec![2, 3]).unwrap();
    let b = g.variable("b", vec![3, 2]).unwrap();
    assert!(matches!(
        g.mul(a, b),
        Err(NeuroptError::IncompatibleShapes { .. })
    ));
}

#[test]
fn test_matmul_and_transpose_shapes() {
    let mut g = Graph::new();
    let a = g.variable("a", vec![2, 3]).unwrap();
    let b = g.variable("b", vec![3, 4]).unwrap();
    let c = g.matmul(a, b).unwrap();
    assert_eq!(g.shape(c).unwrap(), &[2, 4]);
    let t = g.transpose(c).unwrap();
    assert_eq!(g.shape(t).unwrap(), &[4, 2]);
    assert!(g.matmul(a, a).is_err());

    let v = g.variable("v", vec![3]).unwrap();
    assert!(g.transpose(v).is_err());
}

#[test]
fn test_inverse_requires_square() {
    let mut g = Graph::new();
    let sq = g.variable("sq", vec![3, 3]).unwrap();
    let rect = g.variable("rect", vec![3, 2]).unwrap();
    let inv = g.inverse(sq).unwrap();
    assert_eq!(g.shape(inv).unwrap(), &[3, 3]);
    assert!(matches!(
        g.inverse(rect),
        Err(NeuroptError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_reshape_to_same_shape_is_identity() {
    let mut g = Graph::new();
    let x = g.variable("x", vec![2, 2]).unwrap();
    assert_eq!(g.reshape(x, vec![2, 2]).unwrap(), x);
    let flat = g.flatten(x).unwrap();
    assert_eq!(g.shape(flat).unwrap(), &[4]);
    assert!(g.reshape(x, vec![3]).is_err());
}

#[test]
fn test_broadcast_and_sum_to_shapes() {
    let mut g = Graph::new();
    let x = g.variable("x", vec![3]).unwrap();
    let b = g.broadcast_to(x, vec![2, 3]).unwrap();
    assert_eq!(g.shape(b).unwrap(), &[2, 3]);
    let s = g.sum_to(b, vec![1, 3]).unwrap();
    assert_eq!(g.shape(s).unwrap(), &[1, 3]);
    assert!(matches!(
        g.broadcast_to(x, vec![4]),
        Err(NeuroptError::BroadcastError { .. })
    ));
}

#[test]
fn test_reductions_produce_scalars() {
    let mut g = Graph::new();
    let x = g.variable("x", vec![2, 5]).unwrap();
    let s = g.sum(x).unwrap();
    let m = g.mean(x).unwrap();
    assert_eq!(g.shape(s).unwrap(), &[] as &[usize]);
    assert_eq!(g.shape(m).unwrap(), &[] as &[usize]);
}

#[test]
fn test_select_embed_and_element() {
    let mut g = Graph::new();
    let x = g.variable("x", vec![3, 2]).unwrap();
    let row = g.select(x, 2).unwrap();
    assert_eq!(g.shape(row).unwrap(), &[2]);
    assert!(matches!(
        g.select(x, 3),
        Err(NeuroptError::IndexOutOfBounds { index: 3, .. })
    ));

    let back = g.embed(row, 1, 4).unwrap();
    assert_eq!(g.shape(back).unwrap(), &[4, 2]);
    assert!(g.embed(row, 4, 4).is_err());

    let e = g.element(x, 5).unwrap();
    assert_eq!(g.shape(e).unwrap(), &[] as &[usize]);

    let s = g.scalar(1.0);
    assert!(matches!(
        g.select(s, 0),
        Err(NeuroptError::UnsupportedOperation(_))
    ));
}

#[test]
fn test_stack_validates_rows() {
    let mut g = Graph::new();
    let a = g.variable("a", vec![2]).unwrap();
    let b = g.variable("b", vec![2]).unwrap();
    let c = g.variable("c", vec![3]).unwrap();
    let s = g.stack(&[a, b, a]).unwrap();
    assert_eq!(g.shape(s).unwrap(), &[3, 2]);
    assert!(matches!(
        g.stack(&[a, c]),
        Err(NeuroptError::ShapeMismatch { .. })
    ));
    assert_eq!(g.stack(&[]), Err(NeuroptError::EmptyTensorList));
}

#[test]
fn test_map_range_stacks_each_result() {
    let mut g = Graph::new();
    let x = g.variable("x", vec![4]).unwrap();
    let rows = g
        .map_range(4, |graph, i| {
            let e = graph.element(x, i)?;
            graph.broadcast_to(e, vec![4])
        })
        .unwrap();
    assert_eq!(g.shape(rows).unwrap(), &[4, 4]);
    assert_eq!(g.node(rows).unwrap().inputs().len(), 4);
    assert_eq!(g.map_range(0, |graph, _| Ok(graph.scalar(0.0))), Err(NeuroptError::EmptyTensorList));
}

#[test]
fn test_helpers_match_shapes() {
    let mut g = Graph::new();
    let x = g.variable("x", vec![2, 3]).unwrap();
    let z = g.zeros_like(x).unwrap();
    let o = g.ones_like(x).unwrap();
    let s = g.scale(x, 3.0).unwrap();
    let i = g.eye(3);
    assert_eq!(g.shape(z).unwrap(), &[2, 3]);
    assert_eq!(g.shape(o).unwrap(), &[2, 3]);
    assert_eq!(g.shape(s).unwrap(), &[2, 3]);
    assert_eq!(g.shape(i).unwrap(), &[3, 3]);
    match g.node(i).unwrap().op() {
        Op::Constant(t) => assert_eq!(t, &crate::tensor::eye(3)),
        other => panic!("expected constant, got {:?}", other),
    }
}
