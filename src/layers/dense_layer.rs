use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::{a_funcs::ActivFunc, initializer::Initializer};

/// Your run of the mill fully connected (dense) layer.
/// `weights` has shape `(size, in_size)` and `biases` `(size, 1)`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DenseLayer {
    weights: Array2<f32>,
    biases: Array2<f32>,
}

impl DenseLayer {
    pub fn new<I>(mut init: I, in_size: usize, size: usize) -> Self
    where
        I: Initializer,
    {
        let weights = Array2::from_shape_fn((size, in_size), |_| init.get(in_size, size));
        Self {
            weights,
            biases: Array2::zeros((size, 1)),
        }
    }

    pub(crate) fn from_parts(weights: Array2<f32>, biases: Array2<f32>) -> Self {
        Self { weights, biases }
    }

    pub fn weights(&self) -> ArrayView2<'_, f32> {
        self.weights.view()
    }

    pub fn biases(&self) -> ArrayView2<'_, f32> {
        self.biases.view()
    }

    pub fn in_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn size(&self) -> usize {
        self.weights.nrows()
    }

    /// Computes `W·input + b`.
    pub fn weighted_input(&self, input: ArrayView2<f32>) -> Array2<f32> {
        self.weights.dot(&input) + &self.biases
    }

    /// Computes the layer's activation for `input` with `func`.
    pub fn eval<F: ActivFunc>(&self, input: ArrayView2<f32>, func: &F) -> Array2<f32> {
        let mut z = self.weighted_input(input);
        z.mapv_inplace(|x| func.evaluate(x));
        z
    }

    /// Gradients of the layer's parameters given `dz`, the derivative of the cost
    /// with respect to the weighted input, and the layer's `input`, averaged over the batch.
    pub fn gradients(&self, dz: ArrayView2<f32>, input: ArrayView2<f32>) -> LayerGrads {
        let m = dz.ncols() as f32;
        LayerGrads {
            weights: dz.dot(&input.t()) / m,
            biases: dz.sum_axis(Axis(1)).insert_axis(Axis(1)) / m,
        }
    }

    /// Derivative of the cost with respect to this layer's input.
    pub fn input_derivative(&self, dz: ArrayView2<f32>) -> Array2<f32> {
        self.weights.t().dot(&dz)
    }

    pub(crate) fn params_mut(&mut self) -> (&mut Array2<f32>, &mut Array2<f32>) {
        (&mut self.weights, &mut self.biases)
    }
}

/// Gradients (or any per-parameter state shaped like them) of a single dense layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGrads {
    pub weights: Array2<f32>,
    pub biases: Array2<f32>,
}

impl LayerGrads {
    pub fn zeros_like(layer: &DenseLayer) -> Self {
        Self {
            weights: Array2::zeros(layer.weights.raw_dim()),
            biases: Array2::zeros(layer.biases.raw_dim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        a_funcs::Sigmoid,
        helpers::tests::check,
        initializer::{Ones, WeightInit},
    };
    use ndarray::array;

    fn create_layer() -> DenseLayer {
        let init = WeightInit::new((1..=12).map(|x| x as f32));
        DenseLayer::new(init, 4, 3)
    }

    const TOLERANCE: f32 = 0.0001;

    #[test]
    fn dense_shapes() {
        let layer = create_layer();
        assert_eq!(layer.weights().dim(), (3, 4));
        assert_eq!(layer.biases().dim(), (3, 1));
        assert!(layer.biases().iter().all(|b| *b == 0.));
    }

    #[test]
    fn ones_sums_the_input() {
        let layer = DenseLayer::new(Ones, 2, 3);
        assert!(layer.weights().iter().all(|w| *w == 1.));
        let output = layer.weighted_input(array![[1., -2.], [2., 0.5]].view());
        assert_eq!(output, array![[3., -1.5], [3., -1.5], [3., -1.5]]);
    }

    #[test]
    fn dense_weighted_input() {
        let layer = create_layer();
        let input = array![[1.], [2.], [3.], [4.]];
        let output = layer.weighted_input(input.view());
        check(
            &[30., 70., 110.],
            output.as_slice().unwrap(),
            TOLERANCE,
            "output",
        );
    }

    #[test]
    fn dense_eval_applies_activation() {
        let layer = DenseLayer::from_parts(array![[0., 0.]], array![[0.]]);
        let out = layer.eval(array![[3.], [-2.]].view(), &Sigmoid);
        check(&[0.5], out.as_slice().unwrap(), TOLERANCE, "activation");
    }

    #[test]
    fn dense_backprop() {
        let layer = create_layer();
        // batch of two identical columns, so averaging changes nothing
        let input = array![[1., 1.], [2., 2.], [3., 3.], [4., 4.]];
        let dz = array![[0.1, 0.1], [0.2, 0.2], [0.3, 0.3]];
        let grads = layer.gradients(dz.view(), input.view());

        let expected = [0.1, 0.2, 0.3, 0.4, 0.2, 0.4, 0.6, 0.8, 0.3, 0.6, 0.9, 1.2];
        check(
            &expected,
            grads.weights.as_slice().unwrap(),
            TOLERANCE,
            "weight derivatives",
        );
        check(
            &[0.1, 0.2, 0.3],
            grads.biases.as_slice().unwrap(),
            TOLERANCE,
            "bias derivatives",
        );

        let d_in = layer.input_derivative(dz.view());
        check(
            &[3.8, 3.8, 4.4, 4.4, 5., 5., 5.6, 5.6],
            d_in.as_slice().unwrap(),
            TOLERANCE,
            "input derivatives",
        );
    }
}
