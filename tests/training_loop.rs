mod common;

use deep_nn::{
    a_funcs::Activation,
    error::{NetError, ParamError},
    network::FeedForward,
    trainer::{Trainer, TrainingConfig},
};
use ndarray::array;

fn network() -> FeedForward {
    FeedForward::new(2, &[3, 1], Activation::default(), 7).unwrap()
}

#[test]
fn records_iteration_zero_and_last() {
    let (x, y) = common::and_data();
    let config = TrainingConfig {
        iterations: 25,
        step: 1,
        verbose: false,
        ..Default::default()
    };
    let mut trainer = Trainer::gradient_descent(network(), 0.1, config).unwrap();
    let report = trainer.train(x.view(), y.view()).unwrap();

    assert_eq!(report.costs.len(), 26);
    assert_eq!(report.costs.first().map(|c| c.0), Some(0));
    assert_eq!(report.costs.last().map(|c| c.0), Some(25));
    assert_eq!(report.iterations, 25);
    assert_eq!(report.smoothed(0.9).len(), 26);
}

#[test]
fn validation_errors() {
    let (x, y) = common::and_data();
    let bad = |iterations, step| TrainingConfig {
        iterations,
        step,
        ..Default::default()
    };

    assert_eq!(
        Trainer::gradient_descent(network(), 0.1, bad(0, 1)).err(),
        Some(NetError::Param(ParamError::Iterations))
    );
    assert_eq!(
        Trainer::gradient_descent(network(), 0.1, bad(5, 6)).err(),
        Some(NetError::Param(ParamError::Step {
            step: 6,
            iterations: 5
        }))
    );
    assert_eq!(
        Trainer::gradient_descent(network(), -0.1, bad(5, 1)).err(),
        Some(NetError::Param(ParamError::LearningRate(-0.1)))
    );

    let mut trainer = Trainer::gradient_descent(network(), 0.1, bad(5, 1)).unwrap();
    let wide = array![[0., 1.], [1., 0.], [1., 1.]];
    assert!(matches!(
        trainer.train(wide.view(), y.view()),
        Err(NetError::Shape(_))
    ));
    let labels = array![[0., 1., 1., 0.], [1., 0., 0., 1.]];
    assert!(matches!(
        trainer.train(x.view(), labels.view()),
        Err(NetError::Shape(_))
    ));
}

#[test]
fn empty_batch() {
    let mut trainer =
        Trainer::gradient_descent(network(), 0.1, TrainingConfig::default()).unwrap();
    let x = ndarray::Array2::<f32>::zeros((2, 0));
    let y = ndarray::Array2::<f32>::zeros((1, 0));
    assert!(matches!(
        trainer.train(x.view(), y.view()),
        Err(NetError::Shape(_))
    ));

    let mut network = network();
    assert!(network.forward(x.view()).is_err());
}
