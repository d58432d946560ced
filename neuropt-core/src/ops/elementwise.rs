use crate::error::NeuroptError;
use crate::tensor::Tensor;
use std::fmt;

/// Element-wise operators taking one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Neg,
    Exp,
    /// Natural logarithm.
    Ln,
    Tanh,
    Sigmoid,
    Square,
    Sqrt,
    Abs,
    /// `-1`, `0` or `1`. Has zero derivative.
    Sign,
    /// `1` where `x >= threshold`, `0` elsewhere. Has zero derivative.
    StepMask(f64),
}

impl UnaryOp {
    /// Applies the operator to one value.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Exp => x.exp(),
            UnaryOp::Ln => x.ln(),
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            UnaryOp::Square => x * x,
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            UnaryOp::StepMask(threshold) => {
                if x >= threshold {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::StepMask(t) => write!(f, "step_mask({})", t),
            other => write!(f, "{}", format!("{:?}", other).to_lowercase()),
        }
    }
}

/// Element-wise operators taking two inputs of identical shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Applies the operator to one pair of values.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
        }
    }
}

/// Applies a unary operator to every element of `a`.
pub fn unary_op(op: UnaryOp, a: &Tensor) -> Tensor {
    a.map(|x| op.apply(x))
}

/// Applies a binary operator to two tensors of identical shape.
pub fn binary_op(op: BinaryOp, a: &Tensor, b: &Tensor) -> Result<Tensor, NeuroptError> {
    a.zip_with(b, op.name(), |x, y| op.apply(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unary_values() {
        assert_relative_eq!(UnaryOp::Sigmoid.apply(0.0), 0.5);
        assert_relative_eq!(UnaryOp::Ln.apply(std::f64::consts::E), 1.0);
        assert_eq!(UnaryOp::Sign.apply(-3.0), -1.0);
        assert_eq!(UnaryOp::StepMask(0.5).apply(0.5), 1.0);
        assert_eq!(UnaryOp::StepMask(0.5).apply(0.49), 0.0);
    }

    #[test]
    fn test_binary_op_requires_same_shape() {
        let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let b = Tensor::new(vec![3.0, 4.0], vec![2]).unwrap();
        assert_eq!(binary_op(BinaryOp::Div, &b, &a).unwrap().data(), &[3.0, 2.0]);
        let c = Tensor::new(vec![3.0], vec![1]).unwrap();
        assert!(binary_op(BinaryOp::Add, &a, &c).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(UnaryOp::Tanh.to_string(), "tanh");
        assert_eq!(UnaryOp::StepMask(0.1).to_string(), "step_mask(0.1)");
    }
}
