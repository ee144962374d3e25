use std::fs;
use std::path::Path;

use anyhow::Context;
use log::{debug, info, trace};
use ndarray::{s, Array2, ArrayView2};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    data::shuffle_data,
    error::{BuilderError, NetError, ParamError, ShapeError, StateError},
    helpers::moving_average,
    network::{FeedForward, Network},
    optimizer::{
        AlgBuilder, DefaultOptimizer, GradDescBuilder, GradientDescent, InverseTimeDecay,
        OptimizerAlg,
    },
};

mod logger;
pub use logger::{ConsoleLogger, LogFile, Logger, MockLogger};

/// Settings of a training run.
///
/// `verbose` logs the cost every `step` iterations and `graph` keeps those costs in the
/// [`TrainingReport`] for plotting. Can be loaded from a json file.
///
/// With a `batch_size` every iteration is an epoch: the data is shuffled with a generator
/// seeded by `seed` and one update is made per batch, the last batch holding the remainder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub iterations: usize,
    pub verbose: bool,
    pub graph: bool,
    pub step: usize,
    pub decay: Option<InverseTimeDecay>,
    pub early_stopping: Option<StoppingConfig>,
    pub batch_size: Option<usize>,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: 5000,
            verbose: true,
            graph: true,
            step: 100,
            decay: None,
            early_stopping: None,
            batch_size: None,
            seed: 0,
        }
    }
}

impl TrainingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read training config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&s)
            .with_context(|| format!("{} doesn't contain a valid config", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Whether costs are sampled during training.
    pub fn reporting(&self) -> bool {
        self.verbose || self.graph
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if self.iterations == 0 {
            return Err(ParamError::Iterations);
        }
        if self.reporting() && !(1..=self.iterations).contains(&self.step) {
            return Err(ParamError::Step {
                step: self.step,
                iterations: self.iterations,
            });
        }
        if let Some(decay) = &self.decay {
            decay.validate()?;
        }
        if let Some(stopping) = &self.early_stopping {
            stopping.validate()?;
        }
        if self.batch_size == Some(0) {
            return Err(ParamError::BatchSize);
        }
        Ok(())
    }
}

/// Early stopping settings, training stops once the cost failed to improve on the best cost
/// by more than `threshold` for `patience` consecutive iterations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoppingConfig {
    pub threshold: f32,
    pub patience: usize,
}

impl StoppingConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.threshold >= 0.) {
            return Err(ParamError::Threshold(self.threshold));
        }
        if self.patience == 0 {
            return Err(ParamError::Patience);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct EarlyStopping {
    config: StoppingConfig,
    best: f32,
    count: usize,
}

impl EarlyStopping {
    pub fn new(config: StoppingConfig) -> Self {
        Self {
            config,
            best: f32::INFINITY,
            count: 0,
        }
    }

    /// Records `cost` and returns true when training should stop.
    pub fn update(&mut self, cost: f32) -> bool {
        if self.best - cost > self.config.threshold {
            self.best = cost;
            self.count = 0;
        } else {
            self.count += 1;
        }
        self.count >= self.config.patience
    }

    pub fn best(&self) -> f32 {
        self.best
    }
}

/// Outcome of [`Trainer::train`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
    /// Hard predictions of the final forward pass.
    pub predictions: Array2<f32>,
    /// Cost of the final forward pass, regularization included.
    pub cost: f32,
    /// Number of iterations, or epochs when training in batches, that made their updates.
    pub iterations: usize,
    /// Number of parameter updates performed.
    pub updates: usize,
    /// `(iteration, cost)` samples taken every `step` iterations.
    pub costs: Vec<(usize, f32)>,
    /// Iteration early stopping ended the run at, if it did.
    pub stopped_at: Option<usize>,
}

impl TrainingReport {
    /// The sampled costs smoothed by a bias corrected moving average.
    pub fn smoothed(&self, beta: f32) -> Vec<f32> {
        let costs: Vec<f32> = self.costs.iter().map(|(_, c)| *c).collect();
        moving_average(&costs, beta)
    }
}

/// Repeats forward pass, cost and backward pass on a fixed batch.
///
/// Iterations `0..=iterations` are visited and each runs a forward pass, while the backward
/// pass is skipped on the last one. This makes for exactly `iterations` updates and, with
/// `step = 1`, `iterations + 1` cost samples.
///
/// If the network has dropout enabled, the final predictions and cost are taken from an
/// extra forward pass without dropout.
pub struct Trainer<O = GradientDescent> {
    optimizer: DefaultOptimizer<O>,
    config: TrainingConfig,
    logger: Box<dyn Logger>,
}

impl Trainer {
    /// Plain gradient descent with learning rate `alpha`.
    pub fn gradient_descent(
        network: FeedForward,
        alpha: f32,
        config: TrainingConfig,
    ) -> Result<Self, NetError> {
        let optimizer = DefaultOptimizer::new(network, GradDescBuilder::new().l_rate(alpha))?;
        config.validate()?;
        Ok(Self {
            optimizer,
            config,
            logger: Box::new(ConsoleLogger),
        })
    }
}

impl<O: OptimizerAlg> Trainer<O> {
    pub fn builder() -> TrainerBuilder<O> {
        TrainerBuilder::new()
    }

    pub fn train(
        &mut self,
        input: ArrayView2<f32>,
        target: ArrayView2<f32>,
    ) -> Result<TrainingReport, NetError> {
        self.config.validate()?;
        ShapeError::check(
            "input",
            (self.optimizer.in_size(), input.ncols()),
            input.dim(),
        )?;
        ShapeError::check_batch("input", input.dim())?;
        ShapeError::check(
            "labels",
            (self.optimizer.out_size(), input.ncols()),
            target.dim(),
        )?;

        let TrainingConfig {
            iterations,
            verbose,
            step,
            decay,
            early_stopping,
            batch_size,
            seed,
            ..
        } = self.config.clone();
        let reporting = self.config.reporting();
        let m = input.ncols();
        let kind = self.optimizer.output_kind();
        let base_rate = self.optimizer.optimizer().l_rate();

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut stopping = early_stopping.map(EarlyStopping::new);
        let mut costs = Vec::new();
        let mut stopped_at = None;
        let mut updates = 0;
        let mut cost;

        let mut i = 0;
        loop {
            cost = {
                // in batch mode the full pass only measures the cost
                let cache = match batch_size {
                    Some(_) => self.optimizer.forward(input)?,
                    None => self.optimizer.train_forward(input)?,
                };
                kind.cost(cache.output().view(), target)
            } + self.optimizer.penalty(m);

            if reporting && i % step == 0 {
                costs.push((i, cost));
                if verbose {
                    self.logger.cost(i, cost);
                }
            }

            if let Some(stopping) = &mut stopping {
                if stopping.update(cost) {
                    debug!(
                        "Stopping early after {} iterations, best cost {}",
                        i,
                        stopping.best()
                    );
                    stopped_at = Some(i);
                    break;
                }
            }

            if i == iterations {
                break;
            }

            match batch_size {
                None => {
                    self.decay_l_rate(decay.as_ref(), base_rate, updates);
                    self.optimizer.step(target)?;
                    updates += 1;
                }
                Some(size) => {
                    let (x, y) = shuffle_data(input, target, &mut rng)?;
                    let mut start = 0;
                    while start < m {
                        let end = usize::min(start + size, m);
                        self.decay_l_rate(decay.as_ref(), base_rate, updates);
                        self.optimizer.train_forward(x.slice(s![.., start..end]))?;
                        self.optimizer.step(y.slice(s![.., start..end]))?;
                        updates += 1;
                        start = end;
                    }
                    trace!("Epoch {} done after {} updates", i, updates);
                }
            }
            i += 1;
        }

        if decay.is_some() {
            self.optimizer.optimizer_mut().set_l_rate(base_rate);
        }

        if self.optimizer.keep_prob().is_some() {
            cost = {
                let cache = self.optimizer.forward(input)?;
                kind.cost(cache.output().view(), target)
            } + self.optimizer.penalty(m);
        }
        let output = self.optimizer.output().ok_or_else(StateError::new)?;
        let predictions = kind.labels(output.view());
        info!("Training finished after {} updates, cost {}", updates, cost);

        Ok(TrainingReport {
            predictions,
            cost,
            iterations: i,
            updates,
            costs,
            stopped_at,
        })
    }

    fn decay_l_rate(&mut self, decay: Option<&InverseTimeDecay>, base_rate: f32, updates: usize) {
        if let Some(decay) = decay {
            let l_rate = decay.l_rate(base_rate, updates);
            self.optimizer.optimizer_mut().set_l_rate(l_rate);
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn network(&self) -> &FeedForward {
        self.optimizer.network()
    }

    pub fn into_network(self) -> FeedForward {
        self.optimizer.into_network()
    }

    pub fn optimizer(&self) -> &DefaultOptimizer<O> {
        &self.optimizer
    }
}

pub struct TrainerBuilder<O> {
    optimizer: Option<DefaultOptimizer<O>>,
    config: Option<TrainingConfig>,
    logger: Option<Box<dyn Logger>>,
}

impl<O: OptimizerAlg> Default for TrainerBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: OptimizerAlg> TrainerBuilder<O> {
    pub fn new() -> Self {
        Self {
            optimizer: None,
            config: None,
            logger: None,
        }
    }

    pub fn optimizer(mut self, optimizer: DefaultOptimizer<O>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Wraps `network` in a [`DefaultOptimizer`] built from `alg`.
    pub fn network<T>(mut self, network: FeedForward, alg: T) -> Result<Self, ParamError>
    where
        T: AlgBuilder<Output = O>,
    {
        self.optimizer = Some(DefaultOptimizer::new(network, alg)?);
        Ok(self)
    }

    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn logger<L: Logger + 'static>(mut self, logger: L) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    /// The config defaults to [`TrainingConfig::default`] and the logger to [`ConsoleLogger`].
    pub fn build(self) -> Result<Trainer<O>, BuilderError> {
        Ok(Trainer {
            optimizer: self.optimizer.ok_or(BuilderError::new("optimizer"))?,
            config: self.config.unwrap_or_default(),
            logger: self.logger.unwrap_or_else(|| Box::new(ConsoleLogger)),
        })
    }
}
