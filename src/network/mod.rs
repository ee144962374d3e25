pub mod construction;
pub mod feed_forward;

pub use self::construction::LinearBuilder;
pub use self::feed_forward::FeedForward;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{
    error::{NetError, ShapeError},
    helpers::argmax_columns,
    layers::{DenseLayer, LayerGrads},
    loss::{BinaryCrossEntropy, CrossEntropy, LossFunc},
};

/// Trait all neural network architectures must implement
pub trait Network {
    /// Predict the values corresponding to the columns of `input`.
    fn predict(&mut self, input: ArrayView2<f32>) -> Result<&Array2<f32>, ShapeError>;

    /// Get the output of the most recent prediction.
    fn output(&self) -> Option<&Array2<f32>>;

    /// Returns input size of the network
    fn in_size(&self) -> usize;

    /// Return output size of the network
    fn out_size(&self) -> usize;
}

/// Networks that can backpropagate through the cache of their last forward pass.
/// Updating the weights is left to the crate's optimizers, so the layers are only exposed read-only.
pub trait CalcGradients: Network {
    /// Calculates the gradients of every layer from the cache of the last forward pass.
    /// Returns Err if no forward pass happened since the weights last changed.
    fn calc_gradients(&self, target: ArrayView2<f32>) -> Result<Vec<LayerGrads>, NetError>;

    fn layers(&self) -> &[DenseLayer];
}

/// How the last layer turns its weighted input into predictions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// A single sigmoid node performing binary classification.
    Sigmoid,
    /// A softmax over several nodes performing multi-class classification.
    Softmax,
}

impl OutputKind {
    pub fn for_size(size: usize) -> Self {
        if size == 1 {
            OutputKind::Sigmoid
        } else {
            OutputKind::Softmax
        }
    }

    pub fn cost(&self, val: ArrayView2<f32>, target: ArrayView2<f32>) -> f32 {
        match self {
            OutputKind::Sigmoid => BinaryCrossEntropy.cost(val, target),
            OutputKind::Softmax => CrossEntropy.cost(val, target),
        }
    }

    /// Turns activations into hard labels, 0/1 for binary output and one-hot columns otherwise.
    pub fn labels(&self, val: ArrayView2<f32>) -> Array2<f32> {
        match self {
            OutputKind::Sigmoid => val.mapv(f32::round),
            OutputKind::Softmax => {
                let mut labels = Array2::zeros(val.raw_dim());
                for (col, row) in argmax_columns(val).into_iter().enumerate() {
                    labels[[row, col]] = 1.;
                }
                labels
            }
        }
    }
}

/// Activations produced by a forward pass, index 0 being the input itself.
/// A pass with dropout also keeps the mask of every hidden layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Cache {
    activations: Vec<Array2<f32>>,
    masks: Vec<Array2<f32>>,
    keep_prob: f32,
}

impl Cache {
    pub(crate) fn new(activations: Vec<Array2<f32>>) -> Self {
        Self {
            activations,
            masks: Vec::new(),
            keep_prob: 1.,
        }
    }

    pub(crate) fn with_dropout(
        activations: Vec<Array2<f32>>,
        masks: Vec<Array2<f32>>,
        keep_prob: f32,
    ) -> Self {
        Self {
            activations,
            masks,
            keep_prob,
        }
    }

    /// Activation at layer `idx`, 0 being the input batch.
    pub fn activation(&self, idx: usize) -> Option<&Array2<f32>> {
        self.activations.get(idx)
    }

    /// Dropout mask applied to activation `idx`, holding 1 for kept and 0 for dropped nodes.
    /// None for the input, the output and passes without dropout.
    pub fn mask(&self, idx: usize) -> Option<&Array2<f32>> {
        idx.checked_sub(1).and_then(|i| self.masks.get(i))
    }

    pub fn keep_prob(&self) -> f32 {
        self.keep_prob
    }

    pub fn output(&self) -> &Array2<f32> {
        // a cache always holds the input and at least one layer
        &self.activations[self.activations.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    /// Number of examples in the cached batch.
    pub fn batch_size(&self) -> usize {
        self.activations[0].ncols()
    }
}
