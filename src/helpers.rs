use ndarray::{ArrayView1, ArrayView2, Axis};

/// Exponentially weighted moving average of `data`.
/// The bias correction `1 - beta^(i+1)` is recomputed for every element.
pub fn moving_average(data: &[f32], beta: f32) -> Vec<f32> {
    let mut val = 0f32;
    let mut beta_pow = 1f32;
    data.iter()
        .map(|x| {
            val = beta * val + (1. - beta) * x;
            beta_pow *= beta;
            val / (1. - beta_pow)
        })
        .collect()
}

/// Index of the first maximal element.
pub fn argmax(v: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, x) in v.iter().enumerate() {
        if *x > v[best] {
            best = i;
        }
    }
    best
}

/// Arg-max of every column.
pub fn argmax_columns(m: ArrayView2<f32>) -> Vec<usize> {
    m.axis_iter(Axis(1)).map(argmax).collect()
}
