use crate::error::NeuroptError;
use crate::tensor::Tensor;

/// Returns `true` if `from` can be broadcast to `to` under right-aligned rules:
/// every trailing dimension of `from` equals the matching one of `to` or is 1.
pub fn can_broadcast(from: &[usize], to: &[usize]) -> bool {
    if from.len() > to.len() {
        return false;
    }
    let rank_diff = to.len() - from.len();
    from.iter()
        .enumerate()
        .all(|(i, &d)| d == 1 || d == to[rank_diff + i])
}

/// Row-major strides for a contiguous shape.
pub(crate) fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut acc = 1;
    for (i, &dim) in shape.iter().enumerate().rev() {
        strides[i] = acc;
        acc *= dim;
    }
    strides
}

/// Maps a flat index of the broadcast (large) shape to the flat index of the
/// small shape it was broadcast from.
fn broadcast_source_offset(flat: usize, large: &[usize], small: &[usize], small_strides: &[usize]) -> usize {
    let rank_diff = large.len() - small.len();
    let mut remainder = flat;
    let mut offset = 0;
    for d in (0..large.len()).rev() {
        let idx = remainder % large[d];
        remainder /= large[d];
        if d >= rank_diff {
            let sd = d - rank_diff;
            if small[sd] != 1 {
                offset += idx * small_strides[sd];
            }
        }
    }
    offset
}

impl Tensor {
    /// Repeats the tensor along broadcast dimensions to reach `target_shape`.
    pub fn broadcast_to(&self, target_shape: &[usize]) -> Result<Tensor, NeuroptError> {
        if self.shape() == target_shape {
            return Ok(self.clone());
        }
        if !can_broadcast(self.shape(), target_shape) {
            return Err(NeuroptError::BroadcastError {
                from: self.shape().to_vec(),
                to: target_shape.to_vec(),
            });
        }
        let strides = contiguous_strides(self.shape());
        let numel: usize = target_shape.iter().product();
        let data = (0..numel)
            .map(|i| self.data()[broadcast_source_offset(i, target_shape, self.shape(), &strides)])
            .collect();
        Tensor::new(data, target_shape.to_vec())
    }

    /// Reduces the tensor to `target_shape` by summing along broadcast dimensions.
    ///
    /// This is the adjoint of [`Tensor::broadcast_to`]: `target_shape` must
    /// broadcast to the current shape.
    pub fn sum_to(&self, target_shape: &[usize]) -> Result<Tensor, NeuroptError> {
        if self.shape() == target_shape {
            return Ok(self.clone());
        }
        if !can_broadcast(target_shape, self.shape()) {
            return Err(NeuroptError::BroadcastError {
                from: target_shape.to_vec(),
                to: self.shape().to_vec(),
            });
        }
        let strides = contiguous_strides(target_shape);
        let target_numel: usize = target_shape.iter().product();
        let mut data = vec![0.0; target_numel];
        for (i, &value) in self.data().iter().enumerate() {
            data[broadcast_source_offset(i, self.shape(), target_shape, &strides)] += value;
        }
        Tensor::new(data, target_shape.to_vec())
    }
}
