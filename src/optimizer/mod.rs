pub use adam::{Adam, AdamBuilder};
pub mod adam;

pub use decay::InverseTimeDecay;
pub mod decay;

pub use gradient_descent::{GradDescBuilder, GradientDescent};
pub mod gradient_descent;

pub use momentum::{Momentum, MomentumBuilder};
pub mod momentum;

pub use rms_prop::{RmsProp, RmsPropBuilder};
pub mod rms_prop;

use crate::{
    error::ParamError,
    layers::{DenseLayer, LayerGrads},
};

/// This trait provides interface which must be implemented by optimization
/// algorithms so that they can be used by the DefaultOptimizer.
pub trait OptimizerAlg {
    /// Modifies the weights based on the gradients such that a minimum can be reached.
    fn update_weights(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGrads]);

    fn l_rate(&self) -> f32;

    fn set_l_rate(&mut self, l_rate: f32);
}

/// Structs implementing this trait can be constructed into an instance of OptimizerAlg
/// by being provided the layers they will be updating.
pub trait AlgBuilder {
    type Output: OptimizerAlg;
    /// Validates the hyper-parameters and constructs Self::Output
    fn build(self, layers: &[DenseLayer]) -> Result<Self::Output, ParamError>;
}

pub(crate) fn check_l_rate(l_rate: f32) -> Result<(), ParamError> {
    if l_rate > 0. && l_rate.is_finite() {
        Ok(())
    } else {
        Err(ParamError::LearningRate(l_rate))
    }
}

pub(crate) fn check_beta(name: &'static str, value: f32) -> Result<(), ParamError> {
    if (0. ..1.).contains(&value) {
        Ok(())
    } else {
        Err(ParamError::Beta { name, value })
    }
}

pub(crate) fn check_epsilon(epsilon: f32) -> Result<(), ParamError> {
    if epsilon > 0. {
        Ok(())
    } else {
        Err(ParamError::Epsilon(epsilon))
    }
}

/// One zeroed state per layer, shaped like the layer's parameters.
pub(crate) fn zeroed_state(layers: &[DenseLayer]) -> Vec<LayerGrads> {
    layers.iter().map(LayerGrads::zeros_like).collect()
}

pub use base::*;
mod base {
    use super::*;
    use crate::{
        error::NetError,
        loss::l2_penalty,
        network::{CalcGradients, FeedForward},
    };
    use log::trace;
    use ndarray::ArrayView2;
    use std::ops::{Deref, DerefMut};

    /// Drives the backward pass of a network: computes the gradients from the
    /// network's cache and hands them to the optimization algorithm.
    /// It is the only thing that mutates the network's parameters.
    #[derive(Debug, Clone)]
    pub struct DefaultOptimizer<O = GradientDescent> {
        optimizer: O,
        network: FeedForward,
        lambda: f32,
    }

    impl<O: OptimizerAlg> DefaultOptimizer<O> {
        pub fn new<T>(network: FeedForward, optimizer: T) -> Result<Self, ParamError>
        where
            T: AlgBuilder<Output = O>,
        {
            Ok(Self {
                optimizer: optimizer.build(network.layers())?,
                network,
                lambda: 0.,
            })
        }

        /// Enables L2 regularization with the parameter `lambda`.
        pub fn l2(mut self, lambda: f32) -> Result<Self, ParamError> {
            if !(lambda >= 0.) {
                return Err(ParamError::Regularization(lambda));
            }
            self.lambda = lambda;
            Ok(self)
        }

        /// Applies one update using the cache of the network's last forward pass.
        pub fn step(&mut self, target: ArrayView2<f32>) -> Result<(), NetError> {
            let mut grads = self.network.calc_gradients(target)?;
            if self.lambda > 0. {
                let k = self.lambda / target.ncols() as f32;
                for (g, layer) in grads.iter_mut().zip(self.network.layers()) {
                    g.weights.scaled_add(k, &layer.weights());
                }
            }
            trace!("updating {} layers", grads.len());
            self.optimizer
                .update_weights(self.network.layers_mut(), &grads);
            Ok(())
        }

        /// Regularization term added to the cost of a batch of `m` examples.
        pub fn penalty(&self, m: usize) -> f32 {
            if self.lambda > 0. {
                l2_penalty(self.network.layers(), self.lambda, m)
            } else {
                0.
            }
        }

        pub fn network(&self) -> &FeedForward {
            &self.network
        }

        pub fn into_network(self) -> FeedForward {
            self.network
        }

        pub fn optimizer(&self) -> &O {
            &self.optimizer
        }

        pub fn optimizer_mut(&mut self) -> &mut O {
            &mut self.optimizer
        }
    }

    // FeedForward exposes no way of replacing its layers, so handing it out mutably is fine
    impl<O> Deref for DefaultOptimizer<O> {
        type Target = FeedForward;

        fn deref(&self) -> &Self::Target {
            &self.network
        }
    }

    impl<O> DerefMut for DefaultOptimizer<O> {
        fn deref_mut(&mut self) -> &mut Self::Target {
            &mut self.network
        }
    }
}
