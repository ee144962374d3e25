use ndarray::Zip;

use super::*;

/// The adam optimizer algorithm as shown in the research paper <https://arxiv.org/abs/1412.6980>
/// The bias correction of both moments is recomputed on every step.
#[derive(Clone, Debug)]
pub struct Adam {
    momentum: Vec<LayerGrads>,
    velocity: Vec<LayerGrads>,

    beta1: f32,
    beta2: f32,
    epsilon: f32,

    beta1_pow: f32,
    beta2_pow: f32,

    l_rate: f32,
}

impl OptimizerAlg for Adam {
    fn update_weights(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGrads]) {
        assert_eq!(layers.len(), gradients.len());
        assert_eq!(layers.len(), self.momentum.len());
        assert_eq!(layers.len(), self.velocity.len());

        let (beta1, beta2, epsilon, l_rate) = (self.beta1, self.beta2, self.epsilon, self.l_rate);
        let correction1 = 1. - self.beta1_pow;
        let correction2 = 1. - self.beta2_pow;

        let states = self.momentum.iter_mut().zip(&mut self.velocity);
        for ((layer, grads), (m, v)) in layers.iter_mut().zip(gradients).zip(states) {
            let (weights, biases) = layer.params_mut();
            for (w, g, m, v) in [
                (weights, &grads.weights, &mut m.weights, &mut v.weights),
                (biases, &grads.biases, &mut m.biases, &mut v.biases),
            ] {
                Zip::from(w).and(g).and(m).and(v).for_each(|w, &g, m, v| {
                    *m = beta1 * *m + (1. - beta1) * g;
                    *v = beta2 * *v + (1. - beta2) * g * g;
                    let m_hat = *m / correction1;
                    let v_hat = *v / correction2;
                    *w -= l_rate * m_hat / (v_hat.sqrt() + epsilon);
                });
            }
        }

        self.beta1_pow *= self.beta1;
        self.beta2_pow *= self.beta2;
    }

    fn l_rate(&self) -> f32 {
        self.l_rate
    }

    fn set_l_rate(&mut self, l_rate: f32) {
        self.l_rate = l_rate;
    }
}

impl Adam {
    pub fn builder() -> AdamBuilder {
        Default::default()
    }

    pub fn new(beta1: f32, beta2: f32, epsilon: f32, l_rate: f32, layers: &[DenseLayer]) -> Self {
        Self {
            momentum: zeroed_state(layers),
            velocity: zeroed_state(layers),
            beta1,
            beta2,
            epsilon,
            beta1_pow: beta1,
            beta2_pow: beta2,
            l_rate,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdamBuilder {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    l_rate: f32,
}

impl Default for AdamBuilder {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            l_rate: 0.001,
        }
    }
}

impl AdamBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn beta1(mut self, beta1: f32) -> Self {
        self.beta1 = beta1;
        self
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

impl AlgBuilder for AdamBuilder {
    type Output = Adam;

    fn build(self, layers: &[DenseLayer]) -> Result<Self::Output, ParamError> {
        check_l_rate(self.l_rate)?;
        check_beta("beta1", self.beta1)?;
        check_beta("beta2", self.beta2)?;
        check_epsilon(self.epsilon)?;
        Ok(Adam::new(
            self.beta1,
            self.beta2,
            self.epsilon,
            self.l_rate,
            layers,
        ))
    }
}
