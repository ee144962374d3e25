pub mod a_funcs;
pub mod data;
pub mod error;
pub mod helpers;
pub mod initializer;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod trainer;

pub use error::NetError;
pub use network::{FeedForward, LinearBuilder, Network};
pub use trainer::{Trainer, TrainingConfig, TrainingReport};
