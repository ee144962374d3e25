use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ConsError;

/// Element-wise non-linearity used by the hidden layers.
#[enum_dispatch]
pub trait ActivFunc {
    fn evaluate(&self, x: f32) -> f32;
    /// Derivative expressed through the function's output.
    fn derivative(&self, out: f32) -> f32;
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Sigmoid;
impl ActivFunc for Sigmoid {
    fn evaluate(&self, x: f32) -> f32 {
        1. / (1. + (-x).exp())
    }
    fn derivative(&self, out: f32) -> f32 {
        out * (1. - out)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct TanH;
impl ActivFunc for TanH {
    fn evaluate(&self, x: f32) -> f32 {
        x.tanh()
    }
    fn derivative(&self, out: f32) -> f32 {
        1. - out * out
    }
}

/// The hidden layer activation, chosen once when the network is built.
#[enum_dispatch(ActivFunc)]
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Activation {
    Sigmoid,
    TanH,
}

impl Default for Activation {
    fn default() -> Self {
        Sigmoid.into()
    }
}

impl FromStr for Activation {
    type Err = ConsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sig" | "sigmoid" => Ok(Sigmoid.into()),
            "tanh" => Ok(TanH.into()),
            other => Err(ConsError::UnknownActivation(other.to_owned())),
        }
    }
}

/// Replaces every column of `z` with its softmax.
pub fn softmax(z: &mut Array2<f32>) {
    for mut col in z.axis_iter_mut(Axis(1)) {
        let max = col.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        col.mapv_inplace(|x| (x - max).exp());
        let sum = col.sum();
        col.mapv_inplace(|x| x / sum);
    }
}
