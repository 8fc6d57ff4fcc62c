//! Binary cross-entropy for one class of a one-vs-all model

use crate::core::{LogRegError, Objective, Result};
use crate::math::{clip_probability, sigmoid_array, AugmentedFeatures};
use crate::objective::check_design;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};

/// Loss and gradient of a single binary logistic classifier
///
/// `weights` has length D + 1 (bias first), `features` is the raw N x D
/// matrix and `labels` holds 0.0 / 1.0 per row. Returns
/// `-(1/N) * sum(y ln θ + (1 - y) ln(1 - θ))` and `(1/N) * Xbᵗ (θ - y)`.
pub fn one_vs_all_objective(
    weights: &Array1<f64>,
    features: &Array2<f64>,
    labels: &Array1<f64>,
) -> Result<(f64, Array1<f64>)> {
    check_design(features, weights.len(), labels.len())?;
    let augmented = AugmentedFeatures::new(features);
    Ok(binary_loss_and_gradient(weights, &*augmented, labels))
}

/// Fitted probabilities θ = sigmoid(Xb · w), one per row
pub fn one_vs_all_theta(weights: &Array1<f64>, features: &Array2<f64>) -> Result<Array1<f64>> {
    check_design(features, weights.len(), features.nrows())?;
    let augmented = AugmentedFeatures::new(features);
    Ok(sigmoid_array(&augmented.dot(weights)))
}

fn binary_loss_and_gradient<S, T>(
    weights: &ArrayBase<S, Ix1>,
    augmented: &ArrayBase<T, Ix2>,
    labels: &Array1<f64>,
) -> (f64, Array1<f64>)
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    let n_samples = augmented.nrows() as f64;
    let theta = sigmoid_array(&augmented.dot(weights));

    let log_likelihood: f64 = theta
        .iter()
        .zip(labels.iter())
        .map(|(&t, &y)| {
            let t = clip_probability(t);
            y * t.ln() + (1.0 - y) * (1.0 - t).ln()
        })
        .sum();

    let residual = &theta - labels;
    let gradient = augmented.t().dot(&residual) / n_samples;
    (-log_likelihood / n_samples, gradient)
}

/// [`Objective`] for one class, over features augmented once per run
pub struct OneVsAllObjective<'a> {
    features: &'a AugmentedFeatures,
    labels: Array1<f64>,
}

impl<'a> OneVsAllObjective<'a> {
    pub fn new(features: &'a AugmentedFeatures, labels: Array1<f64>) -> Result<Self> {
        if features.n_samples() == 0 {
            return Err(LogRegError::EmptyDataset);
        }
        if labels.len() != features.n_samples() {
            return Err(LogRegError::mismatch(
                "label rows",
                features.n_samples(),
                labels.len(),
            ));
        }
        Ok(Self { features, labels })
    }
}

impl Objective for OneVsAllObjective<'_> {
    fn n_params(&self) -> usize {
        self.features.n_params()
    }

    fn evaluate(&self, params: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        if params.len() != self.n_params() {
            return Err(LogRegError::mismatch(
                "one-vs-all parameters",
                self.n_params(),
                params.len(),
            ));
        }
        Ok(binary_loss_and_gradient(params, &**self.features, &self.labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::numerical_gradient;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn toy_problem() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.1, 0.9, 0.3],
            [0.8, 0.2, 0.5],
            [0.4, 0.4, 0.9],
            [0.0, 1.0, 0.2],
            [0.7, 0.1, 0.6]
        ];
        let y = array![1.0, 0.0, 1.0, 1.0, 0.0];
        (x, y)
    }

    #[test]
    fn test_zero_weights_give_log_two() {
        let (x, y) = toy_problem();
        let w = Array1::zeros(4);
        let theta = one_vs_all_theta(&w, &x).unwrap();
        assert!(theta.iter().all(|&t| t == 0.5));

        let (loss, _) = one_vs_all_objective(&w, &x, &y).unwrap();
        assert_abs_diff_eq!(loss, std::f64::consts::LN_2, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_weights_gradient() {
        let (x, y) = toy_problem();
        let w = Array1::zeros(4);
        let (_, gradient) = one_vs_all_objective(&w, &x, &y).unwrap();
        // bias component is mean(0.5 - y) = 0.5 - 3/5
        assert_abs_diff_eq!(gradient[0], -0.1, epsilon = 1e-12);
        assert_eq!(gradient.len(), 4);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let (x, y) = toy_problem();
        let w = array![0.3, -1.2, 0.7, 0.05];
        let (_, analytic) = one_vs_all_objective(&w, &x, &y).unwrap();
        let numeric = numerical_gradient(
            |p| one_vs_all_objective(p, &x, &y).unwrap().0,
            &w,
            1e-6,
        );
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_abs_diff_eq!(a, n, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_saturated_sigmoid_keeps_loss_finite() {
        let x = array![[1.0], [-1.0]];
        let y = array![0.0, 1.0];
        let w = array![0.0, 1e4];
        let (loss, gradient) = one_vs_all_objective(&w, &x, &y).unwrap();
        assert!(loss.is_finite());
        assert!(gradient.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let (x, y) = toy_problem();
        let w = Array1::zeros(3);
        match one_vs_all_objective(&w, &x, &y) {
            Err(LogRegError::DimensionMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }

        let short_labels = array![1.0, 0.0];
        let w = Array1::zeros(4);
        assert!(matches!(
            one_vs_all_objective(&w, &x, &short_labels),
            Err(LogRegError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_objective_trait_matches_free_function() {
        let (x, y) = toy_problem();
        let augmented = AugmentedFeatures::new(&x);
        let objective = OneVsAllObjective::new(&augmented, y.clone()).unwrap();
        assert_eq!(objective.n_params(), 4);

        let w = array![-0.2, 0.4, 0.1, -0.6];
        let (loss_a, grad_a) = objective.evaluate(&w).unwrap();
        let (loss_b, grad_b) = one_vs_all_objective(&w, &x, &y).unwrap();
        assert_abs_diff_eq!(loss_a, loss_b, epsilon = 1e-15);
        for (a, b) in grad_a.iter().zip(grad_b.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-15);
        }

        assert!(objective.evaluate(&Array1::zeros(5)).is_err());
    }
}
