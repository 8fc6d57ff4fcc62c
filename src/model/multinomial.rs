//! Multinomial (softmax) logistic regression

use crate::core::{Classifier, Method, Minimizer, Result, TrainingConfig};
use crate::math::{argmax_rows, one_hot, softmax_rows, AugmentedFeatures};
use crate::model::{
    linear_scores, validate_training_data, validate_weights, RunSummary, Trained, TrainingReport,
};
use crate::objective::{weights_from_flat, MultinomialObjective};
use crate::optimizer::minimizer_for;
use log::info;
use ndarray::{Array1, Array2};

/// Arg-max prediction for a (D + 1) x K multinomial weight matrix
///
/// Softmax is monotonic within a row, so the arg-max of the raw logits is
/// the arg-max of the class probabilities.
pub fn multinomial_predict(weights: &Array2<f64>, features: &Array2<f64>) -> Result<Array1<usize>> {
    Ok(argmax_rows(&linear_scores(weights, features)?))
}

/// Jointly trained softmax model
#[derive(Debug, Clone, PartialEq)]
pub struct MultinomialModel {
    weights: Array2<f64>,
}

impl MultinomialModel {
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

    /// Softmax class distribution per row; rows sum to one
    pub fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        Ok(softmax_rows(&self.scores(features)?))
    }
}

impl Classifier for MultinomialModel {
    fn scores(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        linear_scores(&self.weights, features)
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        multinomial_predict(&self.weights, features)
    }

    fn n_features(&self) -> usize {
        self.weights.nrows() - 1
    }

    fn n_class(&self) -> usize {
        self.weights.ncols()
    }
}

/// Train with the minimizer selected by `config`
pub fn train_multinomial(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    config: &TrainingConfig,
) -> Result<Trained<MultinomialModel>> {
    config.validate()?;
    let minimizer = minimizer_for(config);
    train_multinomial_with(minimizer.as_ref(), features, labels, config)
}

/// Train all K classes jointly in one minimizer run
///
/// The optimizer sees the (D + 1) x K weight matrix as one flat vector of
/// length (D + 1) · K, starting from zero.
pub fn train_multinomial_with(
    minimizer: &dyn Minimizer,
    features: &Array2<f64>,
    labels: &Array1<usize>,
    config: &TrainingConfig,
) -> Result<Trained<MultinomialModel>> {
    config.validate()?;
    validate_training_data(features, labels, config.n_class)?;
    info!(
        "Training multinomial model: {} samples, {} features, {} classes",
        features.nrows(),
        features.ncols(),
        config.n_class
    );

    let augmented = AugmentedFeatures::new(features);
    let targets = one_hot(labels, config.n_class)?;
    let objective = MultinomialObjective::new(&augmented, targets)?;
    let n_rows = augmented.n_params();

    let result = minimizer.minimize(
        &objective,
        Array1::zeros(n_rows * config.n_class),
        config.max_iterations,
    )?;
    let runs = vec![RunSummary::record(None, &result)];
    let weights = weights_from_flat(&result.params, n_rows, config.n_class)?.to_owned();

    Ok(Trained {
        model: MultinomialModel { weights },
        report: TrainingReport {
            method: Method::Multinomial,
            runs,
        },
    })
}
