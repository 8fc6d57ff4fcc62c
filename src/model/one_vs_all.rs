//! One-vs-all logistic regression: K independent binary classifiers

use crate::core::{Classifier, Method, Minimizer, Result, TrainingConfig};
use crate::math::{argmax_rows, binary_labels, sigmoid_array, AugmentedFeatures};
use crate::model::{
    linear_scores, validate_training_data, validate_weights, RunSummary, Trained, TrainingReport,
};
use crate::objective::OneVsAllObjective;
use crate::optimizer::minimizer_for;
use log::info;
use ndarray::{Array1, Array2, ArrayView1};

/// Arg-max prediction for a (D + 1) x K one-vs-all weight matrix
///
/// Column k holds the weights of the "class k versus the rest" classifier.
/// Returns one label in `0..K` per row of the raw N x D `features`; ties go
/// to the lowest class index.
pub fn one_vs_all_predict(weights: &Array2<f64>, features: &Array2<f64>) -> Result<Array1<usize>> {
    Ok(argmax_rows(&linear_scores(weights, features)?))
}

/// K binary logistic classifiers stored column-wise
#[derive(Debug, Clone, PartialEq)]
pub struct OneVsAllModel {
    weights: Array2<f64>,
}

impl OneVsAllModel {
    /// Wrap a (D + 1) x K weight matrix
    pub fn new(weights: Array2<f64>) -> Result<Self> {
        validate_weights(&weights)?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn into_weights(self) -> Array2<f64> {
        self.weights
    }

    /// Weight vector of the classifier for `class`, bias first
    pub fn class_weights(&self, class: usize) -> Option<ArrayView1<'_, f64>> {
        (class < self.weights.ncols()).then(|| self.weights.column(class))
    }

    /// Per-class probability P(label = k | x) from each binary classifier
    ///
    /// The classifiers are independent, so rows do not sum to one.
    pub fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        Ok(sigmoid_array(&self.scores(features)?))
    }
}

impl Classifier for OneVsAllModel {
    fn scores(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        linear_scores(&self.weights, features)
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        one_vs_all_predict(&self.weights, features)
    }

    fn n_features(&self) -> usize {
        self.weights.nrows() - 1
    }

    fn n_class(&self) -> usize {
        self.weights.ncols()
    }
}

/// Train with the minimizer selected by `config`
pub fn train_one_vs_all(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    config: &TrainingConfig,
) -> Result<Trained<OneVsAllModel>> {
    config.validate()?;
    let minimizer = minimizer_for(config);
    train_one_vs_all_with(minimizer.as_ref(), features, labels, config)
}

/// Train K binary classifiers, one minimizer run per class
///
/// Each run starts from the zero vector and sees only its own 0/1 label
/// column. The runs share nothing but the augmented feature matrix, which
/// is built once up front.
pub fn train_one_vs_all_with(
    minimizer: &dyn Minimizer,
    features: &Array2<f64>,
    labels: &Array1<usize>,
    config: &TrainingConfig,
) -> Result<Trained<OneVsAllModel>> {
    config.validate()?;
    validate_training_data(features, labels, config.n_class)?;
    info!(
        "Training one-vs-all model: {} samples, {} features, {} classes",
        features.nrows(),
        features.ncols(),
        config.n_class
    );

    let augmented = AugmentedFeatures::new(features);
    let n_params = augmented.n_params();
    let mut weights = Array2::zeros((n_params, config.n_class));
    let mut runs = Vec::with_capacity(config.n_class);

    for class in 0..config.n_class {
        let objective = OneVsAllObjective::new(&augmented, binary_labels(labels, class))?;
        let result = minimizer.minimize(&objective, Array1::zeros(n_params), config.max_iterations)?;
        runs.push(RunSummary::record(Some(class), &result));
        weights.column_mut(class).assign(&result.params);
    }

    Ok(Trained {
        model: OneVsAllModel { weights },
        report: TrainingReport {
            method: Method::OneVsAll,
            runs,
        },
    })
}
