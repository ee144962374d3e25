use ndarray::Zip;

use super::*;

/// RMSProp, scales every step by a running average of the squared gradients.
#[derive(Clone, Debug)]
pub struct RmsProp {
    squares: Vec<LayerGrads>,
    beta2: f32,
    epsilon: f32,
    l_rate: f32,
}

impl OptimizerAlg for RmsProp {
    fn update_weights(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGrads]) {
        assert_eq!(layers.len(), gradients.len());
        assert_eq!(layers.len(), self.squares.len());

        let (beta2, epsilon, l_rate) = (self.beta2, self.epsilon, self.l_rate);
        for ((layer, grads), s) in layers.iter_mut().zip(gradients).zip(&mut self.squares) {
            let (weights, biases) = layer.params_mut();
            for (w, g, s) in [
                (weights, &grads.weights, &mut s.weights),
                (biases, &grads.biases, &mut s.biases),
            ] {
                Zip::from(w).and(g).and(s).for_each(|w, &g, s| {
                    *s = beta2 * *s + (1. - beta2) * g * g;
                    *w -= l_rate * g / (s.sqrt() + epsilon);
                });
            }
        }
    }

    fn l_rate(&self) -> f32 {
        self.l_rate
    }

    fn set_l_rate(&mut self, l_rate: f32) {
        self.l_rate = l_rate;
    }
}

#[derive(Clone, Debug)]
pub struct RmsPropBuilder {
    beta2: f32,
    epsilon: f32,
    l_rate: f32,
}

impl Default for RmsPropBuilder {
    fn default() -> Self {
        Self {
            beta2: 0.9,
            epsilon: 1e-8,
            l_rate: 0.001,
        }
    }
}

impl RmsPropBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn beta2(mut self, beta2: f32) -> Self {
        self.beta2 = beta2;
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn l_rate(mut self, l_rate: f32) -> Self {
        self.l_rate = l_rate;
        self
    }
}

impl AlgBuilder for RmsPropBuilder {
    type Output = RmsProp;

    fn build(self, layers: &[DenseLayer]) -> Result<Self::Output, ParamError> {
        check_l_rate(self.l_rate)?;
        check_beta("beta2", self.beta2)?;
        check_epsilon(self.epsilon)?;
        Ok(RmsProp {
            squares: zeroed_state(layers),
            beta2: self.beta2,
            epsilon: self.epsilon,
            l_rate: self.l_rate,
        })
    }
}
