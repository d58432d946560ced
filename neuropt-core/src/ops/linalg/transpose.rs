use crate::error::NeuroptError;
use crate::ops::linalg::matrix_dims;
use crate::tensor::Tensor;

/// Swaps the two axes of a matrix: `[M, N] -> [N, M]`.
pub fn transpose(a: &Tensor) -> Result<Tensor, NeuroptError> {
    let (m, n) = matrix_dims(a, "transpose")?;
    let data = a.data();
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            out[j * m + i] = data[i * n + j];
        }
    }
    Tensor::new(out, vec![n, m])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose() {
        let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
        let t = transpose(&a).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(transpose(&t).unwrap(), a);
    }
}
