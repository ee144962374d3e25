use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of initial weights. `in_size` is the fan-in of the layer being built
/// and `size` its node count.
pub trait Initializer {
    fn get(&mut self, in_size: usize, size: usize) -> f32;
}

/// A borrowed initializer keeps its state between layers.
impl<T: Initializer + ?Sized> Initializer for &mut T {
    fn get(&mut self, in_size: usize, size: usize) -> f32 {
        (**self).get(in_size, size)
    }
}

/// Kaiming (He) initialization, normal draws scaled by `sqrt(2 / fan_in)`.
/// This is what networks use unless told otherwise.
pub struct Kaiming {
    rng: SmallRng,
}
impl Kaiming {
    pub fn new(seed: u64) -> Kaiming {
        Kaiming {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}
impl Default for Kaiming {
    fn default() -> Self {
        Self::new(0)
    }
}
impl Initializer for Kaiming {
    fn get(&mut self, in_size: usize, _: usize) -> f32 {
        self.rng.sample::<f32, _>(StandardNormal) * (2f32 / (in_size as f32)).sqrt()
    }
}

/// Xavier initialization should be used for layers with symetric activation functions such as tanH
pub struct Xavier {
    rng: SmallRng,
}
impl Xavier {
    pub fn new(seed: u64) -> Xavier {
        Xavier {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}
impl Initializer for Xavier {
    fn get(&mut self, in_size: usize, _size: usize) -> f32 {
        self.rng.sample::<f32, _>(StandardNormal) / (in_size as f32).sqrt()
    }
}

/// Always initializes weights to one
pub struct Ones;
impl Initializer for Ones {
    fn get(&mut self, _: usize, _: usize) -> f32 {
        1f32
    }
}

/// This initializer accepts an iterator over f32 values and uses them to initialize the weights,
/// layer by layer in row-major order.
/// Panics if a weight is requested but the iterator returns None.
pub struct WeightInit<T: Iterator<Item = f32>> {
    iter: T,
}
impl<I: Iterator<Item = f32>> WeightInit<I> {
    pub fn new<T: IntoIterator<Item = f32, IntoIter = I>>(weights: T) -> Self {
        Self {
            iter: weights.into_iter(),
        }
    }
}

impl<I: Iterator<Item = f32>> Initializer for WeightInit<I> {
    fn get(&mut self, _in_size: usize, _size: usize) -> f32 {
        self.iter.next().expect("Ran out of weights")
    }
}
