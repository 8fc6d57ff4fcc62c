//! Softmax cross-entropy over all classes jointly

use crate::core::{LogRegError, Objective, Result};
use crate::math::{clip_probability, softmax_rows, AugmentedFeatures};
use crate::objective::check_design;
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, Ix2};

/// View a flat parameter vector as the (D + 1) x K weight matrix
///
/// The layout is row-major: flat index `feature * K + class`.
pub fn weights_from_flat(
    params: &Array1<f64>,
    n_rows: usize,
    n_class: usize,
) -> Result<ArrayView2<'_, f64>> {
    if params.len() != n_rows * n_class {
        return Err(LogRegError::mismatch(
            "multinomial parameters",
            n_rows * n_class,
            params.len(),
        ));
    }
    params
        .view()
        .into_shape((n_rows, n_class))
        .map_err(|e| LogRegError::InvalidParameter(format!("cannot reshape parameters: {e}")))
}

/// Flatten a (D + 1) x K weight matrix into the optimizer's parameter vector
pub fn flatten_weights<S>(weights: &ArrayBase<S, Ix2>) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    weights.iter().copied().collect()
}

/// Loss and flattened gradient of the multinomial model
///
/// `params` has length (D + 1) · K, `features` is the raw N x D matrix and
/// `targets` the N x K one-hot matrix. Returns
/// `-(1/N) * Σᵢ Σₖ Y[i,k] ln θ[i,k]` and `(1/N) * Xbᵗ (θ - Y)` flattened.
pub fn multinomial_objective(
    params: &Array1<f64>,
    features: &Array2<f64>,
    targets: &Array2<f64>,
) -> Result<(f64, Array1<f64>)> {
    let n_class = targets.ncols();
    let weights = weights_from_flat(params, features.ncols() + 1, n_class)?;
    check_design(features, weights.nrows(), targets.nrows())?;
    let augmented = AugmentedFeatures::new(features);
    Ok(softmax_loss_and_gradient(&weights, &*augmented, targets))
}

/// Softmax probabilities θ, one distribution per row
pub fn multinomial_theta(weights: &Array2<f64>, features: &Array2<f64>) -> Result<Array2<f64>> {
    check_design(features, weights.nrows(), features.nrows())?;
    let augmented = AugmentedFeatures::new(features);
    Ok(softmax_rows(&augmented.dot(weights)))
}

fn softmax_loss_and_gradient<S, T>(
    weights: &ArrayBase<S, Ix2>,
    augmented: &ArrayBase<T, Ix2>,
    targets: &Array2<f64>,
) -> (f64, Array1<f64>)
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    let n_samples = augmented.nrows() as f64;
    let theta = softmax_rows(&augmented.dot(weights));

    let log_likelihood: f64 = theta
        .iter()
        .zip(targets.iter())
        .filter(|(_, &y)| y != 0.0)
        .map(|(&t, &y)| y * clip_probability(t).ln())
        .sum();

    let residual = &theta - targets;
    let gradient = augmented.t().dot(&residual) / n_samples;
    (-log_likelihood / n_samples, flatten_weights(&gradient))
}

/// [`Objective`] over all classes, over features augmented once per run
pub struct MultinomialObjective<'a> {
    features: &'a AugmentedFeatures,
    targets: Array2<f64>,
}

impl<'a> MultinomialObjective<'a> {
    pub fn new(features: &'a AugmentedFeatures, targets: Array2<f64>) -> Result<Self> {
        if features.n_samples() == 0 {
            return Err(LogRegError::EmptyDataset);
        }
        if targets.nrows() != features.n_samples() {
            return Err(LogRegError::mismatch(
                "label rows",
                features.n_samples(),
                targets.nrows(),
            ));
        }
        Ok(Self { features, targets })
    }

    pub fn n_class(&self) -> usize {
        self.targets.ncols()
    }
}

impl Objective for MultinomialObjective<'_> {
    fn n_params(&self) -> usize {
        self.features.n_params() * self.n_class()
    }

    fn evaluate(&self, params: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        let weights = weights_from_flat(params, self.features.n_params(), self.n_class())?;
        Ok(softmax_loss_and_gradient(
            &weights,
            &**self.features,
            &self.targets,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::one_hot;
    use crate::objective::numerical_gradient;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn toy_problem() -> (Array2<f64>, Array2<f64>) {
        let x = array![
            [0.2, 0.7],
            [0.9, 0.1],
            [0.5, 0.5],
            [0.1, 0.3],
            [0.6, 0.8],
            [0.3, 0.0]
        ];
        let y = one_hot(&array![0, 1, 2, 0, 2, 1], 3).unwrap();
        (x, y)
    }

    #[test]
    fn test_zero_weights_give_log_k() {
        let x = array![[0.1, 0.2], [0.3, 0.4], [0.9, 0.0]];
        let y = one_hot(&array![3, 7, 9], 10).unwrap();
        let params = Array1::zeros(3 * 10);
        let (loss, _) = multinomial_objective(&params, &x, &y).unwrap();
        assert_abs_diff_eq!(loss, (10.0f64).ln(), epsilon = 1e-12);

        let theta = multinomial_theta(&Array2::zeros((3, 10)), &x).unwrap();
        assert!(theta.iter().all(|&t| (t - 0.1).abs() < 1e-15));
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let (x, y) = toy_problem();
        let params = array![0.3, -0.2, 0.1, 0.5, 0.4, -0.7, -0.1, 0.2, 0.6];
        let (_, analytic) = multinomial_objective(&params, &x, &y).unwrap();
        assert_eq!(analytic.len(), 9);
        let numeric = numerical_gradient(
            |p| multinomial_objective(p, &x, &y).unwrap().0,
            &params,
            1e-6,
        );
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_abs_diff_eq!(a, n, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_gradient_layout_is_row_major() {
        let (x, y) = toy_problem();
        let params = Array1::zeros(9);
        let (_, gradient) = multinomial_objective(&params, &x, &y).unwrap();
        // bias row: mean(1/3 - Y[:, k]) = 1/3 - 2/6 = 0 for every class
        for k in 0..3 {
            assert_abs_diff_eq!(gradient[k], 0.0, epsilon = 1e-12);
        }
        // first feature, class 0: mean(x0 * (1/3 - y0))
        let expected: f64 = x
            .column(0)
            .iter()
            .zip(y.column(0).iter())
            .map(|(&xi, &yi)| xi * (1.0 / 3.0 - yi))
            .sum::<f64>()
            / 6.0;
        assert_abs_diff_eq!(gradient[3], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_large_logits_stay_finite() {
        let x = array![[1.0], [2.0]];
        let y = one_hot(&array![0, 1], 2).unwrap();
        let params = array![0.0, 0.0, 900.0, -900.0];
        let (loss, gradient) = multinomial_objective(&params, &x, &y).unwrap();
        assert!(loss.is_finite());
        assert!(gradient.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn test_weights_round_trip_through_flat_layout() {
        let w = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let flat = flatten_weights(&w);
        assert_eq!(flat, array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(weights_from_flat(&flat, 2, 3).unwrap(), w);
        assert!(weights_from_flat(&flat, 3, 3).is_err());
        assert_eq!(flatten_weights(&w.t().to_owned().t()), flat);
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let (x, y) = toy_problem();
        assert!(matches!(
            multinomial_objective(&Array1::zeros(8), &x, &y),
            Err(LogRegError::DimensionMismatch { .. })
        ));

        let short = y.slice(ndarray::s![..4, ..]).to_owned();
        assert!(matches!(
            multinomial_objective(&Array1::zeros(9), &x, &short),
            Err(LogRegError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_objective_trait_matches_free_function() {
        let (x, y) = toy_problem();
        let augmented = AugmentedFeatures::new(&x);
        let objective = MultinomialObjective::new(&augmented, y.clone()).unwrap();
        assert_eq!(objective.n_params(), 9);
        assert_eq!(objective.n_class(), 3);

        let params = array![0.1, 0.2, -0.3, 0.0, 0.5, -0.5, 0.25, -0.25, 0.0];
        let (loss_a, grad_a) = objective.evaluate(&params).unwrap();
        let (loss_b, grad_b) = multinomial_objective(&params, &x, &y).unwrap();
        assert_abs_diff_eq!(loss_a, loss_b, epsilon = 1e-15);
        for (a, b) in grad_a.iter().zip(grad_b.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_gradient_steps_drive_separable_loss_toward_zero() {
        let x = array![
            [1.0, 0.0],
            [0.9, 0.1],
            [0.0, 1.0],
            [0.1, 0.9],
            [0.0, 0.0],
            [0.1, 0.1]
        ];
        let targets = one_hot(&array![0, 0, 1, 1, 2, 2], 3).unwrap();
        let augmented = AugmentedFeatures::new(&x);
        let objective = MultinomialObjective::new(&augmented, targets).unwrap();

        let mut params = Array1::zeros(9);
        let mut losses = Vec::new();
        for step in 1..=2000 {
            let (_, gradient) = objective.evaluate(&params).unwrap();
            params.scaled_add(-2.0, &gradient);
            if step % 500 == 0 {
                losses.push(objective.evaluate(&params).unwrap().0);
            }
        }

        assert!(losses.windows(2).all(|w| w[1] < w[0]));
        assert!(losses[3] < 0.05, "loss should approach zero, got {}", losses[3]);
    }
}
