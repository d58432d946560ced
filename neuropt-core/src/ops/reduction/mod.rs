// src/ops/reduction/mod.rs

use crate::error::NeuroptError;
use crate::tensor::{scalar, Tensor};

/// Sums every element into a rank-0 tensor.
pub fn sum_all(a: &Tensor) -> Tensor {
    scalar(a.sum())
}

/// Sums `a` down to `shape` along broadcast dimensions.
pub fn sum_to(a: &Tensor, shape: &[usize]) -> Result<Tensor, NeuroptError> {
    a.sum_to(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_all() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let s = sum_all(&t);
        assert!(s.shape().is_empty());
        assert_eq!(s.item().unwrap(), 10.0);
    }
}
