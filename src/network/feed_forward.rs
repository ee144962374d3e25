use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};
use ndarray::{Array2, ArrayView2, Zip};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{construction::LinearBuilder, CalcGradients, Cache, Network, OutputKind};
use crate::a_funcs::{softmax, ActivFunc, Activation, Sigmoid};
use crate::error::{ConsError, NetError, ParamError, ShapeError, StateError};
use crate::initializer::Kaiming;
use crate::layers::{DenseLayer, LayerGrads};
use crate::optimizer::{GradientDescent, OptimizerAlg};

/// A deep neural network performing binary or multi-class classification.
///
/// The layers are only ever changed by the crate's optimizers, everything else gets
/// read-only views. It can be both saved to and loaded from a file.
///
/// ```compile_fail
/// use deep_nn::{a_funcs::Activation, initializer::Ones, layers::DenseLayer, network::FeedForward};
///
/// let mut network = FeedForward::new(2, &[3, 1], Activation::default(), 0).unwrap();
/// network.layers_mut()[1] = DenseLayer::new(Ones, 7, 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "NetworkUnvalidated", try_from = "NetworkUnvalidated")]
pub struct FeedForward {
    activation: Activation,
    layers: Vec<DenseLayer>,
    cache: Option<Cache>,
    // false once the weights change after the cache was filled
    fresh: bool,
    dropout: Option<Dropout>,
}

/// Inverted dropout of the hidden layers, only applied by [`FeedForward::train_forward`].
#[derive(Clone, Debug)]
struct Dropout {
    keep_prob: f32,
    rng: SmallRng,
}

impl FeedForward {
    /// Builds a network with `nx` inputs and a layer for every entry of `sizes`,
    /// initialized with He initialization seeded by `seed`.
    pub fn new(
        nx: usize,
        sizes: &[usize],
        activation: Activation,
        seed: u64,
    ) -> Result<Self, ConsError> {
        LinearBuilder::new(nx)
            .layers(sizes.iter().copied())
            .activation(activation)
            .init(Kaiming::new(seed))
            .build()
    }

    pub(crate) fn construct(
        activation: Activation,
        layers: Vec<DenseLayer>,
    ) -> Result<Self, ConsError> {
        validate(&layers)?;
        Ok(Self {
            activation,
            layers,
            cache: None,
            fresh: false,
            dropout: None,
        })
    }

    /// Number of layers, the input excluded.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// The cache of the most recent forward pass.
    pub fn cache(&self) -> Option<&Cache> {
        self.cache.as_ref()
    }

    pub fn output_kind(&self) -> OutputKind {
        OutputKind::for_size(self.out_size())
    }

    /// Enables inverted dropout for training. Every hidden node is kept with probability
    /// `keep_prob`, the masks being drawn from a generator seeded by `seed`.
    pub fn set_dropout(&mut self, keep_prob: f32, seed: u64) -> Result<(), ParamError> {
        if !(keep_prob > 0. && keep_prob <= 1.) {
            return Err(ParamError::KeepProb(keep_prob));
        }
        self.dropout = Some(Dropout {
            keep_prob,
            rng: SmallRng::seed_from_u64(seed),
        });
        Ok(())
    }

    pub fn clear_dropout(&mut self) {
        self.dropout = None;
    }

    pub fn keep_prob(&self) -> Option<f32> {
        self.dropout.as_ref().map(|d| d.keep_prob)
    }

    /// Runs the batch `input`, laid out `(features, examples)`, through every layer
    /// and stores each layer's activation. Dropout is never applied here.
    pub fn forward(&mut self, input: ArrayView2<f32>) -> Result<&Cache, ShapeError> {
        self.run(input, false)
    }

    /// Same as [`forward`](Self::forward) but applies dropout when it is enabled.
    /// This is the pass the backward step expects during training.
    pub fn train_forward(&mut self, input: ArrayView2<f32>) -> Result<&Cache, ShapeError> {
        self.run(input, true)
    }

    fn run(&mut self, input: ArrayView2<f32>, training: bool) -> Result<&Cache, ShapeError> {
        ShapeError::check("input", (self.in_size(), input.ncols()), input.dim())?;
        ShapeError::check_batch("input", input.dim())?;

        let kind = self.output_kind();
        let last = self.layers.len() - 1;
        let mut dropout = self.dropout.as_mut().filter(|_| training);
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut masks = Vec::new();
        activations.push(input.to_owned());

        for (idx, layer) in self.layers.iter().enumerate() {
            let prev = activations[idx].view();
            let next = if idx == last {
                let mut z = layer.weighted_input(prev);
                match kind {
                    OutputKind::Sigmoid => z.mapv_inplace(|x| Sigmoid.evaluate(x)),
                    OutputKind::Softmax => softmax(&mut z),
                }
                z
            } else {
                let mut a = layer.eval(prev, &self.activation);
                if let Some(Dropout { keep_prob, rng }) = dropout.as_deref_mut() {
                    let p = *keep_prob;
                    let mask = a.map(|_| if rng.gen_bool(p as f64) { 1. } else { 0. });
                    Zip::from(&mut a).and(&mask).for_each(|a, &m| *a *= m / p);
                    masks.push(mask);
                }
                a
            };
            activations.push(next);
        }

        self.fresh = true;
        let cache = match dropout {
            Some(d) => Cache::with_dropout(activations, masks, d.keep_prob),
            None => Cache::new(activations),
        };
        let cache: &Cache = self.cache.insert(cache);
        Ok(cache)
    }

    /// Average cross-entropy of the predictions `val` against `target`.
    pub fn cost(&self, target: ArrayView2<f32>, val: ArrayView2<f32>) -> Result<f32, ShapeError> {
        ShapeError::check("predictions", (self.out_size(), val.ncols()), val.dim())?;
        ShapeError::check("labels", val.dim(), target.dim())?;
        Ok(self.output_kind().cost(val, target))
    }

    /// Returns the network's hard predictions for `input` and their cost against `target`.
    pub fn evaluate(
        &mut self,
        input: ArrayView2<f32>,
        target: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, f32), NetError> {
        let kind = self.output_kind();
        let output = self.forward(input)?.output().view();
        ShapeError::check("labels", output.dim(), target.dim())?;
        Ok((kind.labels(output), kind.cost(output, target)))
    }

    /// One step of plain gradient descent using the cache of the last forward pass.
    pub fn gradient_descent(&mut self, target: ArrayView2<f32>, alpha: f32) -> Result<(), NetError> {
        if !(alpha > 0.) {
            return Err(ParamError::LearningRate(alpha).into());
        }
        let grads = self.calc_gradients(target)?;
        GradientDescent::new(alpha).update_weights(self.layers_mut(), &grads);
        Ok(())
    }

    /// The layers handed to an optimizer for updating. Marks the cache as stale.
    pub(crate) fn layers_mut(&mut self) -> &mut [DenseLayer] {
        self.fresh = false;
        &mut self.layers
    }

    /// Saves the network as json. `.json` is appended to the file name if it's missing.
    /// Returns the path actually written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<PathBuf> {
        let mut path = path.as_ref().to_owned();
        if path.extension().map_or(true, |e| e != "json") {
            let mut name = path.into_os_string();
            name.push(".json");
            path = name.into();
        }
        let json = serde_json::to_string(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to save network to {}", path.display()))?;
        info!("Saved network to {}", path.display());
        Ok(path)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read network from {}", path.display()))?;
        let network: Self = serde_json::from_str(&s)
            .with_context(|| format!("{} doesn't contain a valid network", path.display()))?;
        debug!(
            "Loaded network with {} layers from {}",
            network.layer_count(),
            path.display()
        );
        Ok(network)
    }
}

impl Network for FeedForward {
    fn predict(&mut self, input: ArrayView2<f32>) -> Result<&Array2<f32>, ShapeError> {
        self.forward(input).map(Cache::output)
    }

    fn output(&self) -> Option<&Array2<f32>> {
        self.cache.as_ref().map(Cache::output)
    }

    fn in_size(&self) -> usize {
        self.layers[0].in_size()
    }

    fn out_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }
}

impl CalcGradients for FeedForward {
    fn calc_gradients(&self, target: ArrayView2<f32>) -> Result<Vec<LayerGrads>, NetError> {
        let cache = match &self.cache {
            Some(cache) if self.fresh => cache,
            _ => return Err(StateError::new().into()),
        };
        ShapeError::check_batch("labels", target.dim())?;
        ShapeError::check(
            "labels",
            (self.out_size(), cache.batch_size()),
            target.dim(),
        )?;

        // both output kinds pair with their cross-entropy so that dZ = A - Y
        let mut dz = cache.output() - &target;
        let mut grads = Vec::with_capacity(self.layers.len());

        for (idx, layer) in self.layers.iter().enumerate().rev() {
            let input = &cache.activations[idx];
            grads.push(layer.gradients(dz.view(), input.view()));

            if idx > 0 {
                let mut da = layer.input_derivative(dz.view());
                let activation = self.activation;
                match cache.mask(idx) {
                    // the cached activation was scaled by 1 / keep_prob
                    Some(mask) => {
                        let keep = cache.keep_prob();
                        Zip::from(&mut da).and(input).and(mask).for_each(|d, &a, &m| {
                            *d = if m == 0. {
                                0.
                            } else {
                                *d / keep * activation.derivative(a * keep)
                            };
                        });
                    }
                    None => Zip::from(&mut da)
                        .and(input)
                        .for_each(|d, &a| *d *= activation.derivative(a)),
                }
                dz = da;
            }
        }

        grads.reverse();
        Ok(grads)
    }

    fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }
}

fn validate(layers: &[DenseLayer]) -> Result<(), ConsError> {
    let first = layers.first().ok_or(ConsError::Empty)?;
    if first.in_size() == 0 {
        return Err(ConsError::ZeroInputs);
    }

    let mut expected_input = first.in_size();
    for (index, layer) in layers.iter().enumerate() {
        if layer.in_size() != expected_input {
            return Err(ConsError::Incompatible {
                index,
                received_input: layer.in_size(),
                expected_input,
            });
        }
        if layer.size() == 0 {
            return Err(ConsError::ZeroNodes { index });
        }
        if layer.biases().dim() != (layer.size(), 1) {
            return Err(ConsError::BadBias {
                index,
                expected: (layer.size(), 1),
                received: layer.biases().dim(),
            });
        }
        expected_input = layer.size();
    }
    Ok(())
}

/// When deserializing, we first construct this object, validate that its structure is correct and convert to FeedForward
#[derive(Serialize, Deserialize)]
struct NetworkUnvalidated {
    activation: Activation,
    layers: Vec<DenseLayer>,
}

impl From<FeedForward> for NetworkUnvalidated {
    fn from(network: FeedForward) -> Self {
        NetworkUnvalidated {
            activation: network.activation,
            layers: network.layers,
        }
    }
}

impl TryFrom<NetworkUnvalidated> for FeedForward {
    type Error = ConsError;

    fn try_from(value: NetworkUnvalidated) -> Result<Self, Self::Error> {
        FeedForward::construct(value.activation, value.layers)
    }
}
