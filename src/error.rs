use std::error::Error;
use std::fmt;

/// An error during the construction of a network, either from a layer schedule
/// or from a deserialized model.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsError {
    /// The network must accept at least one input feature.
    ZeroInputs,
    /// No layers were provided.
    Empty,
    /// A layer was declared with zero nodes.
    ZeroNodes { index: usize },
    /// The activation name isn't one of the supported ones.
    UnknownActivation(String),
    /// A layer is incompatible with the previous one
    Incompatible {
        index: usize,
        received_input: usize,
        expected_input: usize,
    },
    /// A bias vector doesn't have the shape `(nodes, 1)`.
    BadBias {
        index: usize,
        expected: (usize, usize),
        received: (usize, usize),
    },
}

impl Error for ConsError {}

impl fmt::Display for ConsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsError::ZeroInputs => f.write_str("nx must be a positive integer"),
            ConsError::Empty => {
                f.write_str("The network must have at least a single layer, but it was empty.")
            }
            ConsError::ZeroNodes { index } => f.write_fmt(format_args!(
                "layers must be a list of positive integers, layer {} has no nodes",
                index
            )),
            ConsError::UnknownActivation(name) => f.write_fmt(format_args!(
                "activation must be 'sig' or 'tanh', received '{}'",
                name
            )),
            ConsError::Incompatible {
                index,
                received_input,
                expected_input,
            } => f.write_fmt(format_args!(
                "Layer {} is incompatible with its input:\n\tExpected input length of {} but received {}.",
                index, expected_input, received_input,
            )),
            ConsError::BadBias {
                index,
                expected,
                received,
            } => f.write_fmt(format_args!(
                "Layer {} has biases of shape {:?}, expected {:?}.",
                index, received, expected
            )),
        }
    }
}

/// A matrix handed to the network doesn't have the shape it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeError {
    pub what: &'static str,
    pub expected: (usize, usize),
    pub received: (usize, usize),
}

impl ShapeError {
    pub fn new(what: &'static str, expected: (usize, usize), received: (usize, usize)) -> Self {
        Self {
            what,
            expected,
            received,
        }
    }

    /// Returns Err if the two shapes differ.
    pub(crate) fn check(
        what: &'static str,
        expected: (usize, usize),
        received: (usize, usize),
    ) -> Result<(), Self> {
        if expected == received {
            Ok(())
        } else {
            Err(Self::new(what, expected, received))
        }
    }

    /// Returns Err if the batch of shape `received` holds no examples.
    pub(crate) fn check_batch(what: &'static str, received: (usize, usize)) -> Result<(), Self> {
        if received.1 == 0 {
            Err(Self::new(what, (received.0, 1), received))
        } else {
            Ok(())
        }
    }
}

impl Error for ShapeError {}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.received.1 == 0 && self.expected.1 != 0 {
            return write!(
                f,
                "{} holds no examples, received shape {:?}",
                self.what, self.received
            );
        }
        write!(
            f,
            "shape mismatch for {}: expected {:?}, received {:?}",
            self.what, self.expected, self.received
        )
    }
}

/// Invalid training or optimizer hyper-parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    Iterations,
    LearningRate(f32),
    Step { step: usize, iterations: usize },
    Beta { name: &'static str, value: f32 },
    Epsilon(f32),
    Regularization(f32),
    Decay,
    Patience,
    Threshold(f32),
    KeepProb(f32),
    BatchSize,
}

impl Error for ParamError {}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::Iterations => f.write_str("iterations must be a positive integer"),
            ParamError::LearningRate(l_rate) => {
                write!(f, "learning rate must be positive, received {}", l_rate)
            }
            ParamError::Step { step, iterations } => write!(
                f,
                "step must be positive and <= iterations, received step {} for {} iterations",
                step, iterations
            ),
            ParamError::Beta { name, value } => {
                write!(f, "{} must lie in [0, 1), received {}", name, value)
            }
            ParamError::Epsilon(e) => write!(f, "epsilon must be positive, received {}", e),
            ParamError::Regularization(l) => write!(
                f,
                "regularization parameter must be non-negative, received {}",
                l
            ),
            ParamError::Decay => {
                f.write_str("decay rate must be non-negative and decay step positive")
            }
            ParamError::Patience => f.write_str("patience must be a positive integer"),
            ParamError::Threshold(t) => {
                write!(f, "threshold must be non-negative, received {}", t)
            }
            ParamError::KeepProb(p) => {
                write!(f, "keep_prob must lie in (0, 1], received {}", p)
            }
            ParamError::BatchSize => f.write_str("batch_size must be a positive integer"),
        }
    }
}

/// Error encountered when calculating the weight gradients.
/// It means that no forward pass has populated the cache since the weights last changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateError;

impl StateError {
    pub fn new() -> Self {
        Self
    }
}

impl Error for StateError {}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cache not initialized, run a forward pass before calculating gradients")
    }
}

/// A required builder field wasn't provided.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderError {
    missing: &'static str,
}

impl BuilderError {
    pub fn new(missing: &'static str) -> Self {
        Self { missing }
    }
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing field '{}'", self.missing)
    }
}

impl Error for BuilderError {}

/// Any error produced while constructing, evaluating or training a network.
#[derive(Debug, Clone, PartialEq)]
pub enum NetError {
    Construction(ConsError),
    Shape(ShapeError),
    Param(ParamError),
    State(StateError),
}

impl Error for NetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetError::Construction(e) => Some(e),
            NetError::Shape(e) => Some(e),
            NetError::Param(e) => Some(e),
            NetError::State(e) => Some(e),
        }
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Construction(e) => e.fmt(f),
            NetError::Shape(e) => e.fmt(f),
            NetError::Param(e) => e.fmt(f),
            NetError::State(e) => e.fmt(f),
        }
    }
}

macro_rules! impl_from_error {
    ($variant:ident, $t:ty) => {
        impl From<$t> for NetError {
            fn from(e: $t) -> Self {
                NetError::$variant(e)
            }
        }
    };
}

impl_from_error!(Construction, ConsError);
impl_from_error!(Shape, ShapeError);
impl_from_error!(Param, ParamError);
impl_from_error!(State, StateError);
