use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array2;

use deep_nn::{
    a_funcs::Activation,
    network::FeedForward,
    optimizer::{DefaultOptimizer, GradDescBuilder},
};

fn batch(nx: usize, m: usize) -> (Array2<f32>, Array2<f32>) {
    let x = Array2::from_shape_fn((nx, m), |(r, c)| ((r * m + c) as f32 * 0.37).sin());
    let y = Array2::from_shape_fn((1, m), |(_, c)| (c % 2) as f32);
    (x, y)
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn forward_bench(c: &mut Criterion) {
    init_logger();
    let (x, _) = batch(100, 100);
    let mut network = FeedForward::new(100, &[100, 100, 1], Activation::default(), 0).unwrap();

    c.bench_function("forward_100_100_100_1", |b| {
        b.iter(|| {
            let cache = network.forward(black_box(x.view())).unwrap();
            black_box(cache.output()[[0, 0]]);
        })
    });
}

fn training_step_bench(c: &mut Criterion) {
    init_logger();
    let (x, y) = batch(100, 100);
    let network = FeedForward::new(100, &[100, 100, 1], Activation::default(), 0).unwrap();
    let mut optimizer =
        DefaultOptimizer::new(network, GradDescBuilder::new().l_rate(0.1)).unwrap();

    c.bench_function("training_step_100_100_100_1", |b| {
        b.iter(|| {
            optimizer.forward(black_box(x.view())).unwrap();
            optimizer.step(black_box(y.view())).unwrap();
        })
    });
}

criterion_group!(benches, forward_bench, training_step_bench);
criterion_main!(benches);
