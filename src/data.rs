//! Preparing labels and features for training. Every matrix is laid out
//! `(features, examples)`, one example per column.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{error::ShapeError, helpers::argmax_columns};

/// Converts numeric labels into a `(classes, labels.len())` one-hot matrix.
/// Returns None if there are no labels, no classes, or a label doesn't fit in `classes`.
pub fn one_hot_encode(labels: &[usize], classes: usize) -> Option<Array2<f32>> {
    if labels.is_empty() || classes == 0 || labels.iter().any(|l| *l >= classes) {
        return None;
    }
    let mut one_hot = Array2::zeros((classes, labels.len()));
    for (col, label) in labels.iter().enumerate() {
        one_hot[[*label, col]] = 1.;
    }
    Some(one_hot)
}

/// Label of every column, the index of its largest entry.
pub fn one_hot_decode(one_hot: ArrayView2<f32>) -> Vec<usize> {
    argmax_columns(one_hot)
}

/// Mean and population standard deviation of every feature.
/// Returns None for a matrix without examples.
pub fn normalization_constants(x: ArrayView2<f32>) -> Option<(Array1<f32>, Array1<f32>)> {
    let mean = x.mean_axis(Axis(1))?;
    let std = x.std_axis(Axis(1), 0.);
    Some((mean, std))
}

/// Standardizes every feature with the given constants.
pub fn normalize(
    x: ArrayView2<f32>,
    mean: ArrayView1<f32>,
    std: ArrayView1<f32>,
) -> Result<Array2<f32>, ShapeError> {
    ShapeError::check("mean", (x.nrows(), 1), (mean.len(), 1))?;
    ShapeError::check("standard deviation", (x.nrows(), 1), (std.len(), 1))?;
    let mean = mean.insert_axis(Axis(1));
    let std = std.insert_axis(Axis(1));
    Ok((&x - &mean) / &std)
}

/// Shuffles the examples of `x` and `y` with the same permutation.
pub fn shuffle_data<R: Rng + ?Sized>(
    x: ArrayView2<f32>,
    y: ArrayView2<f32>,
    rng: &mut R,
) -> Result<(Array2<f32>, Array2<f32>), ShapeError> {
    ShapeError::check("labels", (y.nrows(), x.ncols()), y.dim())?;
    let mut order: Vec<usize> = (0..x.ncols()).collect();
    order.shuffle(rng);
    Ok((x.select(Axis(1), &order), y.select(Axis(1), &order)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::tests::check;
    use ndarray::array;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn encode_and_decode() {
        let labels = [2, 0, 1, 2];
        let one_hot = one_hot_encode(&labels, 3).unwrap();
        assert_eq!(
            one_hot,
            array![[0., 1., 0., 0.], [0., 0., 1., 0.], [1., 0., 0., 1.]]
        );
        assert_eq!(one_hot_decode(one_hot.view()), labels.to_vec());
    }

    #[test]
    fn encode_rejects_bad_input() {
        assert_eq!(one_hot_encode(&[], 3), None);
        assert_eq!(one_hot_encode(&[0, 1], 0), None);
        assert_eq!(one_hot_encode(&[0, 3], 3), None);
    }

    #[test]
    fn standardizes_features() {
        let x = array![[1., 3., 5.], [10., 10., 10.], [-2., 0., 2.]];
        let (mean, std) = normalization_constants(x.view()).unwrap();
        check(&[3., 10., 0.], mean.as_slice().unwrap(), 1e-6, "mean");
        let s = (8f32 / 3.).sqrt();
        check(&[s, 0., s], std.as_slice().unwrap(), 1e-6, "std");

        let rows = array![[1., 3., 5.], [-2., 0., 2.]];
        let (mean, std) = normalization_constants(rows.view()).unwrap();
        let normalized = normalize(rows.view(), mean.view(), std.view()).unwrap();
        let (mean, std) = normalization_constants(normalized.view()).unwrap();
        check(&[0., 0.], mean.as_slice().unwrap(), 1e-6, "normalized mean");
        check(&[1., 1.], std.as_slice().unwrap(), 1e-5, "normalized std");

        assert!(normalize(rows.view(), array![0.].view(), array![1.].view()).is_err());
    }

    #[test]
    fn shuffles_pairs_together() {
        let x = array![[0., 1., 2., 3., 4.], [0., 10., 20., 30., 40.]];
        let y = array![[0., 1., 2., 3., 4.]];
        let mut rng = SmallRng::seed_from_u64(3);
        let (xs, ys) = shuffle_data(x.view(), y.view(), &mut rng).unwrap();

        for col in 0..5 {
            assert_eq!(xs[[0, col]], ys[[0, col]]);
            assert_eq!(xs[[1, col]], ys[[0, col]] * 10.);
        }
        let mut seen: Vec<f32> = ys.iter().copied().collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, vec![0., 1., 2., 3., 4.]);

        assert!(shuffle_data(x.view(), array![[1., 2.]].view(), &mut rng).is_err());
    }
}
