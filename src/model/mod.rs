//! Trained models, predictors and training orchestration

pub mod multinomial;
pub mod one_vs_all;
pub mod report;

pub use self::multinomial::*;
pub use self::one_vs_all::*;
pub use self::report::*;

use crate::core::{Classifier, LogRegError, Method, Result};
use crate::math::{validate_labels, AugmentedFeatures};
use crate::objective::check_design;
use ndarray::{Array1, Array2};

/// A model together with the diagnostics of the run that produced it
#[derive(Debug, Clone)]
pub struct Trained<M> {
    pub model: M,
    pub report: TrainingReport,
}

/// Either trained family behind one type
#[derive(Debug, Clone, PartialEq)]
pub enum LinearModel {
    OneVsAll(OneVsAllModel),
    Multinomial(MultinomialModel),
}

impl LinearModel {
    pub fn method(&self) -> Method {
        match self {
            LinearModel::OneVsAll(_) => Method::OneVsAll,
            LinearModel::Multinomial(_) => Method::Multinomial,
        }
    }

    pub fn weights(&self) -> &Array2<f64> {
        match self {
            LinearModel::OneVsAll(model) => model.weights(),
            LinearModel::Multinomial(model) => model.weights(),
        }
    }

    /// Sigmoid scores for one-vs-all, softmax rows for multinomial
    pub fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            LinearModel::OneVsAll(model) => model.predict_proba(features),
            LinearModel::Multinomial(model) => model.predict_proba(features),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            LinearModel::OneVsAll(model) => model,
            LinearModel::Multinomial(model) => model,
        }
    }
}

impl Classifier for LinearModel {
    fn scores(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        self.inner().scores(features)
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        self.inner().predict(features)
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn n_class(&self) -> usize {
        self.inner().n_class()
    }
}

impl From<OneVsAllModel> for LinearModel {
    fn from(model: OneVsAllModel) -> Self {
        LinearModel::OneVsAll(model)
    }
}

impl From<MultinomialModel> for LinearModel {
    fn from(model: MultinomialModel) -> Self {
        LinearModel::Multinomial(model)
    }
}

/// Xb · W for a raw N x D feature matrix and a (D + 1) x K weight matrix
pub(crate) fn linear_scores(weights: &Array2<f64>, features: &Array2<f64>) -> Result<Array2<f64>> {
    if weights.ncols() == 0 {
        return Err(LogRegError::InvalidParameter(
            "weight matrix has no class columns".to_string(),
        ));
    }
    let (n_samples, n_features) = features.dim();
    if n_samples == 0 {
        if weights.nrows() != n_features + 1 {
            return Err(LogRegError::mismatch(
                "weight rows (features + bias)",
                n_features + 1,
                weights.nrows(),
            ));
        }
        return Ok(Array2::zeros((0, weights.ncols())));
    }
    check_design(features, weights.nrows(), n_samples)?;
    Ok(AugmentedFeatures::new(features).dot(weights))
}

/// Shape, finiteness and label-range checks run before any training
pub(crate) fn validate_training_data(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    n_class: usize,
) -> Result<()> {
    if features.nrows() == 0 {
        return Err(LogRegError::EmptyDataset);
    }
    if labels.len() != features.nrows() {
        return Err(LogRegError::mismatch(
            "label rows",
            features.nrows(),
            labels.len(),
        ));
    }
    if features.iter().any(|v| !v.is_finite()) {
        return Err(LogRegError::NonFiniteInput(
            "feature values must be finite".to_string(),
        ));
    }
    validate_labels(labels, n_class)
}

/// Weight matrices handed to a model constructor must be (D + 1) x K with K >= 2
pub(crate) fn validate_weights(weights: &Array2<f64>) -> Result<()> {
    if weights.nrows() == 0 {
        return Err(LogRegError::InvalidParameter(
            "weight matrix needs at least the bias row".to_string(),
        ));
    }
    if weights.ncols() < 2 {
        return Err(LogRegError::InvalidParameter(format!(
            "weight matrix needs at least 2 class columns, got {}",
            weights.ncols()
        )));
    }
    if weights.iter().any(|v| !v.is_finite()) {
        return Err(LogRegError::NonFiniteInput(
            "weights must be finite".to_string(),
        ));
    }
    Ok(())
}
