//! High-level API for logistic regression
//!
//! This module provides a user-friendly interface for common tasks,
//! including training, prediction, evaluation and persistence.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rlogreg::api::LogisticRegression;
//! use rlogreg::data::CsvDigits;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let train = CsvDigits::from_file("train.csv")?;
//! let model = LogisticRegression::multinomial()
//!     .with_max_iterations(100)
//!     .train_dataset(&train)?;
//!
//! let test = CsvDigits::from_file("test.csv")?;
//! let metrics = model.evaluate_dataset(&test)?;
//! println!("Accuracy: {:.2}%", metrics.accuracy() * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{Classifier, LogRegError, Method, MinimizerKind, Result, TrainingConfig};
use crate::data::{CsvDigits, LabeledMatrix};
use crate::model::{train_multinomial, train_one_vs_all, LinearModel, TrainingReport};
use crate::persistence::WeightArtifact;
use ndarray::{Array1, Array2};
use std::path::Path;

/// High-level logistic regression interface with builder pattern
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    method: Method,
    config: TrainingConfig,
}

impl LogisticRegression {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            config: TrainingConfig::default(),
        }
    }

    /// K independent binary classifiers
    pub fn one_vs_all() -> Self {
        Self::new(Method::OneVsAll)
    }

    /// One joint softmax classifier
    pub fn multinomial() -> Self {
        Self::new(Method::Multinomial)
    }

    /// Set the number of classes
    pub fn with_n_class(mut self, n_class: usize) -> Self {
        self.config.n_class = n_class;
        self
    }

    /// Set maximum number of iterations per minimizer run
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the gradient infinity-norm tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.gradient_tolerance = tolerance;
        self
    }

    pub fn with_minimizer(mut self, minimizer: MinimizerKind) -> Self {
        self.config.minimizer = minimizer;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on a feature matrix and its labels
    pub fn train(&self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<TrainedModel> {
        let (model, report) = match self.method {
            Method::OneVsAll => {
                let trained = train_one_vs_all(features, labels, &self.config)?;
                (LinearModel::from(trained.model), trained.report)
            }
            Method::Multinomial => {
                let trained = train_multinomial(features, labels, &self.config)?;
                (LinearModel::from(trained.model), trained.report)
            }
        };
        Ok(TrainedModel {
            model,
            report: Some(report),
            config: Some(self.config.clone()),
        })
    }

    pub fn train_dataset(&self, dataset: &LabeledMatrix) -> Result<TrainedModel> {
        self.train(&dataset.features, &dataset.labels)
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<TrainedModel> {
        let dataset = CsvDigits::from_file(path)?;
        self.train_dataset(&dataset)
    }
}

/// Trained model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: LinearModel,
    report: Option<TrainingReport>,
    config: Option<TrainingConfig>,
}

impl TrainedModel {
    /// Rebuild a model from a stored artifact
    pub fn from_artifact(artifact: &WeightArtifact) -> Result<Self> {
        Ok(Self {
            model: artifact.to_model()?,
            report: artifact.metadata.report.clone(),
            config: artifact.metadata.training_params.clone(),
        })
    }

    pub fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>> {
        self.model.predict(features)
    }

    pub fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        self.model.predict_proba(features)
    }

    /// Accuracy, per-class counts and confusion matrix
    pub fn evaluate(
        &self,
        features: &Array2<f64>,
        labels: &Array1<usize>,
    ) -> Result<EvaluationMetrics> {
        let predictions = self.predict(features)?;
        EvaluationMetrics::from_predictions(&predictions, labels, self.model.n_class())
    }

    pub fn evaluate_dataset(&self, dataset: &LabeledMatrix) -> Result<EvaluationMetrics> {
        self.evaluate(&dataset.features, &dataset.labels)
    }

    /// Artifact carrying the weights and whatever training metadata is known
    pub fn to_artifact(&self) -> WeightArtifact {
        let mut artifact = WeightArtifact::from_model(&self.model);
        artifact.metadata.training_params = self.config.clone();
        artifact.metadata.report = self.report.clone();
        artifact
    }

    pub fn method(&self) -> Method {
        self.model.method()
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn weights(&self) -> &Array2<f64> {
        self.model.weights()
    }

    /// Optimizer diagnostics, absent for models loaded without them
    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }
}

/// Fraction of positions where `predictions` equals `truth`
pub fn accuracy(predictions: &Array1<usize>, truth: &Array1<usize>) -> Result<f64> {
    if predictions.len() != truth.len() {
        return Err(LogRegError::mismatch(
            "prediction count",
            truth.len(),
            predictions.len(),
        ));
    }
    if truth.is_empty() {
        return Err(LogRegError::EmptyDataset);
    }
    let correct = predictions
        .iter()
        .zip(truth.iter())
        .filter(|(pred, actual)| pred == actual)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Detailed multi-class evaluation metrics
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub correct: usize,
    pub total: usize,
    /// Correct predictions per true class
    pub per_class_correct: Vec<usize>,
    /// Rows per true class
    pub per_class_total: Vec<usize>,
    /// `confusion[[truth, predicted]]` counts
    pub confusion: Array2<usize>,
}

impl EvaluationMetrics {
    pub fn from_predictions(
        predictions: &Array1<usize>,
        truth: &Array1<usize>,
        n_class: usize,
    ) -> Result<Self> {
        if predictions.len() != truth.len() {
            return Err(LogRegError::mismatch(
                "prediction count",
                truth.len(),
                predictions.len(),
            ));
        }

        let mut confusion = Array2::zeros((n_class, n_class));
        for (&pred, &actual) in predictions.iter().zip(truth.iter()) {
            for label in [pred, actual] {
                if label >= n_class {
                    return Err(LogRegError::InvalidLabel { label, n_class });
                }
            }
            confusion[[actual, pred]] += 1;
        }

        let per_class_correct: Vec<usize> = (0..n_class).map(|k| confusion[[k, k]]).collect();
        let per_class_total: Vec<usize> = confusion.rows().into_iter().map(|row| row.sum()).collect();
        Ok(Self {
            correct: per_class_correct.iter().sum(),
            total: truth.len(),
            per_class_correct,
            per_class_total,
            confusion,
        })
    }

    /// Overall accuracy as a fraction; 0 for an empty evaluation
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Recall of one class, `None` when the class never occurs
    pub fn class_accuracy(&self, class: usize) -> Option<f64> {
        let total = *self.per_class_total.get(class)?;
        if total == 0 {
            return None;
        }
        Some(self.per_class_correct[class] as f64 / total as f64)
    }

    pub fn n_class(&self) -> usize {
        self.per_class_total.len()
    }
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;
    use crate::data::synthetic::seeded_blobs;

    /// Train with default parameters on a CSV file
    pub fn train_csv<P: AsRef<Path>>(path: P, method: Method) -> Result<TrainedModel> {
        LogisticRegression::new(method).train_from_csv(path)
    }

    /// Train on the training file and report accuracy on the test file
    pub fn evaluate_split<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
        method: Method,
    ) -> Result<f64> {
        let model = train_csv(train_path, method)?;
        let test = CsvDigits::from_file(test_path)?;
        Ok(model.evaluate_dataset(&test)?.accuracy())
    }

    /// Training accuracy of both families on seeded synthetic blobs
    pub fn blobs_accuracy(n_class: usize, per_class: usize, seed: u64) -> Result<Vec<(Method, f64)>> {
        let data = seeded_blobs(n_class, per_class, seed)?;
        [Method::OneVsAll, Method::Multinomial]
            .into_iter()
            .map(|method| -> Result<(Method, f64)> {
                let model = LogisticRegression::new(method)
                    .with_n_class(n_class)
                    .train_dataset(&data)?;
                Ok((method, model.evaluate_dataset(&data)?.accuracy()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn two_clusters() -> (Array2<f64>, Array1<usize>) {
        let features = array![
            [0.1, 0.2],
            [0.2, 0.1],
            [0.0, 0.3],
            [0.9, 0.8],
            [0.8, 1.0],
            [1.0, 0.9],
        ];
        (features, array![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_builder_pattern() {
        let builder = LogisticRegression::multinomial()
            .with_n_class(3)
            .with_max_iterations(50)
            .with_tolerance(1e-4)
            .with_minimizer(MinimizerKind::Lbfgs);

        assert_eq!(builder.method(), Method::Multinomial);
        assert_eq!(builder.config().n_class, 3);
        assert_eq!(builder.config().max_iterations, 50);
        assert_eq!(builder.config().gradient_tolerance, 1e-4);
        assert_eq!(builder.config().minimizer, MinimizerKind::Lbfgs);
    }

    #[test]
    fn test_train_both_methods() {
        let (features, labels) = two_clusters();
        for builder in [LogisticRegression::one_vs_all(), LogisticRegression::multinomial()] {
            let method = builder.method();
            let model = builder.with_n_class(2).train(&features, &labels).unwrap();
            assert_eq!(model.method(), method);
            assert_eq!(model.weights().dim(), (3, 2));
            assert_eq!(model.predict(&features).unwrap(), labels);
            assert!(model.report().is_some());

            let metrics = model.evaluate(&features, &labels).unwrap();
            assert_eq!(metrics.accuracy(), 1.0);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (features, labels) = two_clusters();
        let result = LogisticRegression::one_vs_all()
            .with_n_class(2)
            .with_max_iterations(0)
            .train(&features, &labels);
        assert!(matches!(result, Err(LogRegError::InvalidParameter(_))));
    }

    #[test]
    fn test_accuracy() {
        let truth = array![0, 1, 2, 1];
        assert_eq!(accuracy(&array![0, 1, 1, 1], &truth).unwrap(), 0.75);
        assert_eq!(accuracy(&truth, &truth).unwrap(), 1.0);
        assert!(matches!(
            accuracy(&array![0, 1], &truth),
            Err(LogRegError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            accuracy(&Array1::zeros(0), &Array1::zeros(0)),
            Err(LogRegError::EmptyDataset)
        ));
    }

    #[test]
    fn test_evaluation_metrics() {
        let truth = array![0, 0, 1, 1, 2, 2];
        let predictions = array![0, 1, 1, 1, 0, 2];
        let metrics = EvaluationMetrics::from_predictions(&predictions, &truth, 4).unwrap();

        assert_eq!(metrics.correct, 4);
        assert_eq!(metrics.total, 6);
        assert!((metrics.accuracy() - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(metrics.per_class_total, vec![2, 2, 2, 0]);
        assert_eq!(metrics.per_class_correct, vec![1, 2, 1, 0]);
        assert_eq!(metrics.confusion[[0, 1]], 1);
        assert_eq!(metrics.confusion[[2, 0]], 1);
        assert_eq!(metrics.class_accuracy(1), Some(1.0));
        assert_eq!(metrics.class_accuracy(3), None);
        assert_eq!(metrics.class_accuracy(9), None);
        assert_eq!(metrics.n_class(), 4);

        assert!(EvaluationMetrics::from_predictions(&array![0], &truth, 4).is_err());
        assert!(matches!(
            EvaluationMetrics::from_predictions(&array![5], &array![0], 4),
            Err(LogRegError::InvalidLabel { label: 5, n_class: 4 })
        ));
    }

    #[test]
    fn test_artifact_round_trip_through_model() {
        let (features, labels) = two_clusters();
        let model = LogisticRegression::multinomial()
            .with_n_class(2)
            .train(&features, &labels)
            .unwrap();

        let artifact = model.to_artifact();
        assert_eq!(artifact.layout, Method::Multinomial);
        assert!(artifact.metadata.report.is_some());

        let restored = TrainedModel::from_artifact(&artifact).unwrap();
        assert_eq!(restored.weights(), model.weights());
        assert_eq!(restored.predict(&features).unwrap(), model.predict(&features).unwrap());
    }

    #[test]
    fn test_quick_helpers() {
        let mut train = NamedTempFile::new().unwrap();
        writeln!(train, "x0,x1,label").unwrap();
        for (row, label) in [([0.1, 0.2], 0), ([0.2, 0.1], 0), ([0.9, 0.8], 1), ([0.8, 1.0], 1)] {
            writeln!(train, "{},{},{}", row[0], row[1], label).unwrap();
        }
        train.flush().unwrap();

        let model = LogisticRegression::one_vs_all()
            .with_n_class(2)
            .train_from_csv(train.path())
            .unwrap();
        assert_eq!(model.method(), Method::OneVsAll);

        // The default of ten classes leaves classes 2..9 without rows.
        let accuracy = quick::evaluate_split(train.path(), train.path(), Method::Multinomial)
            .unwrap();
        assert_eq!(accuracy, 1.0);

        let results = quick::blobs_accuracy(3, 40, 11).unwrap();
        assert_eq!(results.len(), 2);
        for (_, accuracy) in results {
            assert!(accuracy >= 0.95);
        }
    }
}
