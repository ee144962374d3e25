use ndarray::{array, Array2};

use deep_nn::data::one_hot_encode;

/// The AND truth table, a single example per column.
pub fn and_data() -> (Array2<f32>, Array2<f32>) {
    (
        array![[0., 0., 1., 1.], [0., 1., 0., 1.]],
        array![[0., 0., 0., 1.]],
    )
}

/// Points on a line split into three consecutive classes.
pub fn three_classes() -> (Array2<f32>, Array2<f32>) {
    let n = 30;
    let x = Array2::from_shape_fn((1, n), |(_, c)| c as f32 / n as f32 * 2. - 1.);
    let labels: Vec<usize> = (0..n).map(|c| c * 3 / n).collect();
    let y = one_hot_encode(&labels, 3).unwrap();
    (x, y)
}
