use crate::error::NeuroptError;
use crate::ops::linalg::matrix_dims;
use crate::tensor::Tensor;

/// Performs matrix multiplication C = A @ B.
/// Supports only 2D tensors (matrices).
/// A: [M, K], B: [K, N] -> C: [M, N]
pub fn matmul(a: &Tensor, b: &Tensor) -> Result<Tensor, NeuroptError> {
    let (m, k) = matrix_dims(a, "matmul")?;
    let (k2, n) = matrix_dims(b, "matmul")?;
    if k != k2 {
        return Err(NeuroptError::IncompatibleShapes {
            shape1: a.shape().to_vec(),
            shape2: b.shape().to_vec(),
            operation: "matmul".to_string(),
        });
    }

    let a_data = a.data();
    let b_data = b.data();
    let mut output_data = vec![0.0; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a_data[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            let b_row = &b_data[p * n..(p + 1) * n];
            let out_row = &mut output_data[i * n..(i + 1) * n];
            for (o, &b_pj) in out_row.iter_mut().zip(b_row) {
                *o += a_ip * b_pj;
            }
        }
    }
    Tensor::new(output_data, vec![m, n])
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
