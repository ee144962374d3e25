use ndarray::{ArrayView2, Zip};

use crate::layers::DenseLayer;

/// Added to `1 - a` in the binary cost so that a saturated output doesn't produce `log(0)`.
pub const LOG_FLOOR: f32 = 0.0000001;

/// Average cost per example of a batch of predictions laid out `(outputs, batch)`.
pub trait LossFunc {
    fn cost(&self, val: ArrayView2<f32>, target: ArrayView2<f32>) -> f32;
}

/// Logistic regression cost for a single sigmoid output.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCrossEntropy;

impl LossFunc for BinaryCrossEntropy {
    fn cost(&self, val: ArrayView2<f32>, target: ArrayView2<f32>) -> f32 {
        assert_eq!(
            val.dim(),
            target.dim(),
            "Value matrix must be the same shape as target matrix."
        );
        let m = val.ncols() as f32;
        let sum = Zip::from(val)
            .and(target)
            .fold(0f32, |acc, &a, &y| {
                acc + y * a.ln() + (1. - y) * (1. + LOG_FLOOR - a).ln()
            });
        -sum / m
    }
}

/// Categorical cross-entropy for a softmax output.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrossEntropy;

impl LossFunc for CrossEntropy {
    fn cost(&self, val: ArrayView2<f32>, target: ArrayView2<f32>) -> f32 {
        assert_eq!(
            val.dim(),
            target.dim(),
            "Value matrix must be the same shape as target matrix."
        );
        let m = val.ncols() as f32;
        let sum = Zip::from(val)
            .and(target)
            .fold(0f32, |acc, &a, &y| acc + y * a.ln());
        -sum / m
    }
}

/// L2 regularization term `lambda / (2m) * sum(||W||²)` over every layer.
pub fn l2_penalty(layers: &[DenseLayer], lambda: f32, m: usize) -> f32 {
    let squares: f32 = layers
        .iter()
        .map(|l| l.weights().iter().map(|w| w * w).sum::<f32>())
        .sum();
    lambda * squares / (2. * m as f32)
}
