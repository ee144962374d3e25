use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Staircase inverse time decay of the learning rate,
/// `l_rate / (1 + rate * floor(step / decay_step))`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InverseTimeDecay {
    pub rate: f32,
    pub decay_step: usize,
}

impl InverseTimeDecay {
    pub fn new(rate: f32, decay_step: usize) -> Result<Self, ParamError> {
        let decay = Self { rate, decay_step };
        decay.validate()?;
        Ok(decay)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if self.rate >= 0. && self.decay_step > 0 {
            Ok(())
        } else {
            Err(ParamError::Decay)
        }
    }

    /// Learning rate after `step` updates starting from `l_rate`.
    pub fn l_rate(&self, l_rate: f32, step: usize) -> f32 {
        l_rate / (1. + self.rate * (step / self.decay_step) as f32)
    }
}
