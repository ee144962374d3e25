use super::*;

/// Gradient descent simply steps the weights based on their derivatives.
#[derive(Clone, Debug)]
pub struct GradientDescent {
    l_rate: f32,
}

impl OptimizerAlg for GradientDescent {
    fn update_weights(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGrads]) {
        assert_eq!(layers.len(), gradients.len());
        let k = -self.l_rate;
        for (layer, grads) in layers.iter_mut().zip(gradients) {
            let (weights, biases) = layer.params_mut();
            weights.scaled_add(k, &grads.weights);
            biases.scaled_add(k, &grads.biases);
        }
    }

    fn l_rate(&self) -> f32 {
        self.l_rate
    }

    fn set_l_rate(&mut self, l_rate: f32) {
        self.l_rate = l_rate;
    }
}

impl GradientDescent {
    pub fn builder() -> GradDescBuilder {
        Default::default()
    }

    pub fn new(l_rate: f32) -> Self {
        Self { l_rate }
    }
}

/// Constructor for [GradientDescent](self::GradientDescent)
#[derive(Clone, Debug)]
pub struct GradDescBuilder {
    l_rate: f32,
}

impl Default for GradDescBuilder {
    fn default() -> Self {
        Self { l_rate: 0.05 }
    }
}

impl GradDescBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn l_rate(mut self, l_rate: f32) -> Self {
        self.l_rate = l_rate;
        self
    }
}

impl AlgBuilder for GradDescBuilder {
    type Output = GradientDescent;

    fn build(self, _layers: &[DenseLayer]) -> Result<Self::Output, ParamError> {
        check_l_rate(self.l_rate)?;
        Ok(GradientDescent::new(self.l_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::tests::check;
    use ndarray::array;

    #[test]
    fn steps_against_gradient() {
        let mut layers = vec![DenseLayer::from_parts(array![[1., -1.]], array![[0.5]])];
        let grads = vec![LayerGrads {
            weights: array![[0.2, -0.4]],
            biases: array![[1.]],
        }];
        GradientDescent::new(0.5).update_weights(&mut layers, &grads);
        check(
            &[0.9, -0.8],
            layers[0].weights().as_slice().unwrap(),
            1e-6,
            "weights",
        );
        check(&[0.], layers[0].biases().as_slice().unwrap(), 1e-6, "biases");
    }
}
