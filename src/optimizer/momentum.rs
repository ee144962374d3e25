use ndarray::Zip;

use super::*;

/// Gradient descent with momentum, `v = beta1 * v + (1 - beta1) * g` followed by `w -= l_rate * v`.
#[derive(Clone, Debug)]
pub struct Momentum {
    velocity: Vec<LayerGrads>,
    beta1: f32,
    l_rate: f32,
}

impl OptimizerAlg for Momentum {
    fn update_weights(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGrads]) {
        assert_eq!(layers.len(), gradients.len());
        assert_eq!(layers.len(), self.velocity.len());

        let (beta1, l_rate) = (self.beta1, self.l_rate);
        for ((layer, grads), v) in layers.iter_mut().zip(gradients).zip(&mut self.velocity) {
            let (weights, biases) = layer.params_mut();
            for (w, g, v) in [
                (weights, &grads.weights, &mut v.weights),
                (biases, &grads.biases, &mut v.biases),
            ] {
                Zip::from(w).and(g).and(v).for_each(|w, &g, v| {
                    *v = beta1 * *v + (1. - beta1) * g;
                    *w -= l_rate * *v;
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
pub struct MomentumBuilder {
    beta1: f32,
    l_rate: f32,
}

impl Default for MomentumBuilder {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            l_rate: 0.05,
        }
    }
}

impl MomentumBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn beta1(mut self, beta1: f32) -> Self {
        self.beta1 = beta1;
        self
    }

    pub fn l_rate(mut self, l_rate: f32) -> Self {
        self.l_rate = l_rate;
        self
    }
}

impl AlgBuilder for MomentumBuilder {
    type Output = Momentum;

    fn build(self, layers: &[DenseLayer]) -> Result<Self::Output, ParamError> {
        check_l_rate(self.l_rate)?;
        check_beta("beta1", self.beta1)?;
        Ok(Momentum {
            velocity: zeroed_state(layers),
            beta1: self.beta1,
            l_rate: self.l_rate,
        })
    }
}
