pub mod dense_layer;

pub use dense_layer::{DenseLayer, LayerGrads};
