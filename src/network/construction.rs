use crate::{
    a_funcs::Activation,
    error::ConsError,
    initializer::{Initializer, Kaiming},
    layers::DenseLayer,
};

use super::FeedForward;

/// Builder for networks where every layer is a dense layer feeding the next one.
///
/// ```
/// use deep_nn::{a_funcs::TanH, initializer::Kaiming, network::LinearBuilder};
///
/// let network = LinearBuilder::new(3)
///     .layers([5, 3, 1])
///     .activation(TanH)
///     .init(Kaiming::new(42))
///     .build()
///     .unwrap();
/// assert_eq!(network.layer_count(), 3);
/// ```
pub struct LinearBuilder<I = Kaiming> {
    in_size: usize,
    sizes: Vec<usize>,
    activation: Activation,
    init: I,
}

impl LinearBuilder {
    pub fn new(in_size: usize) -> Self {
        LinearBuilder {
            in_size,
            sizes: Vec::new(),
            activation: Activation::default(),
            init: Kaiming::default(),
        }
    }
}

impl<I> LinearBuilder<I>
where
    I: Initializer,
{
    /// Adds a single layer with `size` nodes.
    pub fn layer(mut self, size: usize) -> Self {
        self.sizes.push(size);
        self
    }

    /// Adds a layer for every size provided.
    pub fn layers<T>(mut self, sizes: T) -> Self
    where
        T: IntoIterator<Item = usize>,
    {
        self.sizes.extend(sizes);
        self
    }

    /// Sets the activation of every layer but the last.
    pub fn activation<A: Into<Activation>>(mut self, activation: A) -> Self {
        self.activation = activation.into();
        self
    }

    /// Replaces the weight initializer.
    pub fn init<J: Initializer>(self, init: J) -> LinearBuilder<J> {
        LinearBuilder {
            in_size: self.in_size,
            sizes: self.sizes,
            activation: self.activation,
            init,
        }
    }

    /// Checks the schedule and builds the network.
    pub fn build(self) -> Result<FeedForward, ConsError> {
        if self.in_size == 0 {
            return Err(ConsError::ZeroInputs);
        }
        if self.sizes.is_empty() {
            return Err(ConsError::Empty);
        }
        if let Some(index) = self.sizes.iter().position(|s| *s == 0) {
            return Err(ConsError::ZeroNodes { index });
        }

        let mut init = self.init;
        let mut in_size = self.in_size;
        let mut layers = Vec::with_capacity(self.sizes.len());
        for size in self.sizes {
            layers.push(DenseLayer::new(&mut init, in_size, size));
            in_size = size;
        }

        FeedForward::construct(self.activation, layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a_funcs::TanH;

    #[test]
    fn shapes_follow_schedule() {
        let net = LinearBuilder::new(4).layers([5, 3, 2]).build().unwrap();
        let dims: Vec<_> = net
            .layers()
            .iter()
            .map(|l| (l.weights().dim(), l.biases().dim()))
            .collect();
        assert_eq!(
            dims,
            vec![((5, 4), (5, 1)), ((3, 5), (3, 1)), ((2, 3), (2, 1))]
        );
    }

    #[test]
    fn rejects_bad_schedules() {
        assert_eq!(
            LinearBuilder::new(0).layer(1).build().unwrap_err(),
            ConsError::ZeroInputs
        );
        assert_eq!(
            LinearBuilder::new(2).build().unwrap_err(),
            ConsError::Empty
        );
        assert_eq!(
            LinearBuilder::new(2).layers([3, 0, 1]).build().unwrap_err(),
            ConsError::ZeroNodes { index: 1 }
        );
    }

    #[test]
    fn same_seed_same_weights() {
        let a = LinearBuilder::new(3)
            .layers([4, 1])
            .activation(TanH)
            .init(Kaiming::new(3))
            .build()
            .unwrap();
        let b = LinearBuilder::new(3)
            .layers([4, 1])
            .activation(TanH)
            .init(Kaiming::new(3))
            .build()
            .unwrap();
        assert_eq!(a.layers(), b.layers());
    }
}
