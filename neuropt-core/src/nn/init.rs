//! Initial values for parameters.
//!
//! Every initializer returns a fresh [`Tensor`]; randomness always comes from
//! a caller-supplied generator so that runs can be seeded.

use crate::error::NeuroptError;
use crate::tensor::{self, Tensor};
use rand::Rng;

/// Tensor of zeros.
pub fn zeros(shape: &[usize]) -> Tensor {
    tensor::zeros(shape)
}

/// Tensor filled with `value`.
pub fn constant(shape: &[usize], value: f64) -> Tensor {
    tensor::full(shape, value)
}

/// Samples from `N(0, std²)`.
pub fn normal<R: Rng + ?Sized>(shape: &[usize], std: f64, rng: &mut R) -> Result<Tensor, NeuroptError> {
    tensor::rand_normal(shape, 0.0, std, rng)
}

/// Samples from `U(-bound, bound)`.
pub fn uniform<R: Rng + ?Sized>(shape: &[usize], bound: f64, rng: &mut R) -> Result<Tensor, NeuroptError> {
    tensor::rand_uniform(shape, -bound, bound, rng)
}

/// Computes `(fan_in, fan_out)` of a weight of the given shape.
///
/// A 2-D weight `[in, out]` gives `(in, out)`; a 1-D one uses its length for
/// both.
///
/// # Errors
/// Returns `UnsupportedOperation` for scalars, tensors of rank above 2 and
/// shapes with a zero fan.
pub fn fan_in_and_fan_out(shape: &[usize]) -> Result<(usize, usize), NeuroptError> {
    let fans = match shape {
        [n] => (*n, *n),
        [fan_in, fan_out] => (*fan_in, *fan_out),
        other => {
            return Err(NeuroptError::UnsupportedOperation(format!(
                "fan in/out needs a 1-D or 2-D shape, got {:?}",
                other
            )))
        }
    };
    if fans.0 == 0 || fans.1 == 0 {
        return Err(NeuroptError::UnsupportedOperation(format!(
            "fan in/out of an empty shape {:?}",
            shape
        )));
    }
    Ok(fans)
}

/// Glorot uniform: `U(-a, a)` with `a = gain * sqrt(6 / (fan_in + fan_out))`.
pub fn xavier_uniform<R: Rng + ?Sized>(shape: &[usize], gain: f64, rng: &mut R) -> Result<Tensor, NeuroptError> {
    let (fan_in, fan_out) = fan_in_and_fan_out(shape)?;
    let bound = gain * (6.0 / (fan_in + fan_out) as f64).sqrt();
    uniform(shape, bound, rng)
}

/// He normal: `N(0, 2 / fan_in)`.
pub fn kaiming_normal<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor, NeuroptError> {
    let (fan_in, _) = fan_in_and_fan_out(shape)?;
    normal(shape, (2.0 / fan_in as f64).sqrt(), rng)
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
