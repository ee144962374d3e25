//! Error analysis from a confusion matrix whose rows are the actual classes
//! and whose columns are the predicted ones.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::{error::ShapeError, helpers::argmax_columns};

/// Counts how often every actual class got predicted as every class.
/// `labels` and `predictions` are one-hot `(classes, examples)` matrices.
pub fn confusion_matrix(
    labels: ArrayView2<f32>,
    predictions: ArrayView2<f32>,
) -> Result<Array2<f32>, ShapeError> {
    if labels.nrows() == 0 {
        return Err(ShapeError::new("labels", (1, labels.ncols()), labels.dim()));
    }
    ShapeError::check("predictions", labels.dim(), predictions.dim())?;
    let classes = labels.nrows();
    let mut confusion = Array2::zeros((classes, classes));
    for (actual, predicted) in argmax_columns(labels)
        .into_iter()
        .zip(argmax_columns(predictions))
    {
        confusion[[actual, predicted]] += 1.;
    }
    Ok(confusion)
}

/// True positive rate of every class.
pub fn sensitivity(confusion: ArrayView2<f32>) -> Array1<f32> {
    confusion.diag().to_owned() / confusion.sum_axis(Axis(1))
}

/// Positive predictive value of every class.
pub fn precision(confusion: ArrayView2<f32>) -> Array1<f32> {
    confusion.diag().to_owned() / confusion.sum_axis(Axis(0))
}

/// True negative rate of every class.
pub fn specificity(confusion: ArrayView2<f32>) -> Array1<f32> {
    let total = confusion.sum();
    let actual = confusion.sum_axis(Axis(1));
    let predicted = confusion.sum_axis(Axis(0));
    let diag = confusion.diag();

    let mut specificity = Array1::zeros(diag.len());
    for i in 0..diag.len() {
        let true_negative = total - actual[i] - predicted[i] + diag[i];
        let false_positive = predicted[i] - diag[i];
        specificity[i] = true_negative / (true_negative + false_positive);
    }
    specificity
}

/// Harmonic mean of sensitivity and precision for every class.
pub fn f1_score(confusion: ArrayView2<f32>) -> Array1<f32> {
    let sens = sensitivity(confusion);
    let prec = precision(confusion);
    2. * &sens * &prec / (&sens + &prec)
}

/// Fraction of all examples that were classified correctly.
pub fn accuracy(confusion: ArrayView2<f32>) -> f32 {
    confusion.diag().sum() / confusion.sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::tests::check;
    use ndarray::array;

    fn confusion() -> Array2<f32> {
        array![[5., 1., 0.], [2., 6., 2.], [0., 1., 3.]]
    }

    #[test]
    fn counts_pairs() {
        let labels = array![[1., 0., 0., 1.], [0., 1., 0., 0.], [0., 0., 1., 0.]];
        let predictions = array![[1., 0., 0., 0.], [0., 1., 1., 0.], [0., 0., 0., 1.]];
        let confusion = confusion_matrix(labels.view(), predictions.view()).unwrap();
        assert_eq!(
            confusion,
            array![[1., 0., 1.], [0., 1., 0.], [0., 1., 0.]]
        );
        assert!(confusion_matrix(labels.view(), array![[1.]].view()).is_err());
    }

    #[test]
    fn labels_without_classes() {
        let empty = Array2::<f32>::zeros((0, 3));
        assert_eq!(
            confusion_matrix(empty.view(), empty.view()).unwrap_err(),
            ShapeError::new("labels", (1, 3), (0, 3))
        );
    }

    #[test]
    fn rates() {
        let c = confusion();
        check(
            &[5. / 6., 0.6, 0.75],
            sensitivity(c.view()).as_slice().unwrap(),
            1e-6,
            "sensitivity",
        );
        check(
            &[5. / 7., 0.75, 0.6],
            precision(c.view()).as_slice().unwrap(),
            1e-6,
            "precision",
        );
        // class 0: tn = 20 - 6 - 7 + 5 = 12, fp = 2
        check(
            &[12. / 14., 8. / 10., 14. / 16.],
            specificity(c.view()).as_slice().unwrap(),
            1e-6,
            "specificity",
        );
        let f1 = f1_score(c.view());
        check(&[2. * 0.6 * 0.75 / 1.35], &[f1[1]], 1e-6, "f1");
        check(&[0.7], &[accuracy(c.view())], 1e-6, "accuracy");
    }
}
