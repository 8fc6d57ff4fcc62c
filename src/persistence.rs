//! Weight artifact serialization and persistence
//!
//! A trained model is stored as pretty-printed JSON holding the (D + 1) x K
//! weight matrix, which family it belongs to, the feature pipeline fitted at
//! training time (if any) and some metadata for tracking.

use crate::core::{Classifier, LogRegError, Method, Result, TrainingConfig};
use crate::model::{LinearModel, MultinomialModel, OneVsAllModel, TrainingReport};
use crate::utils::FeaturePipeline;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Default artifact name for one-vs-all weights
pub const ONE_VS_ALL_FILE: &str = "params.json";
/// Default artifact name for multinomial weights
pub const MULTINOMIAL_FILE: &str = "params_bonus.json";

pub fn default_file_name(method: Method) -> &'static str {
    match method {
        Method::OneVsAll => ONE_VS_ALL_FILE,
        Method::Multinomial => MULTINOMIAL_FILE,
    }
}

/// Serializable trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightArtifact {
    /// Which family the weight columns belong to
    pub layout: Method,
    pub weights: Array2<f64>,
    /// Column filter and scale to replay on raw inputs
    pub pipeline: Option<FeaturePipeline>,
    pub metadata: ArtifactMetadata,
}

/// Artifact metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Library version used to create the artifact
    pub library_version: String,
    /// Model input width, without the bias
    pub n_features: usize,
    pub n_class: usize,
    pub training_params: Option<TrainingConfig>,
    /// Per-run optimizer outcome
    pub report: Option<TrainingReport>,
    /// Creation timestamp
    pub created_at: String,
}

impl WeightArtifact {
    /// Wrap a trained model with fresh metadata
    pub fn from_model(model: &LinearModel) -> Self {
        Self {
            layout: model.method(),
            weights: model.weights().clone(),
            pipeline: None,
            metadata: ArtifactMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_features: model.n_features(),
                n_class: model.n_class(),
                training_params: None,
                report: None,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn with_training(mut self, config: TrainingConfig, report: TrainingReport) -> Self {
        self.metadata.training_params = Some(config);
        self.metadata.report = Some(report);
        self
    }

    pub fn with_pipeline(mut self, pipeline: FeaturePipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Save artifact to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| LogRegError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate an artifact from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let artifact: Self = serde_json::from_reader(reader)
            .map_err(|e| LogRegError::SerializationError(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check the weight shape against the metadata and the pipeline
    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.weights.dim();
        if rows != self.metadata.n_features + 1 {
            return Err(LogRegError::mismatch(
                "artifact weight rows (features + bias)",
                self.metadata.n_features + 1,
                rows,
            ));
        }
        if cols != self.metadata.n_class {
            return Err(LogRegError::mismatch(
                "artifact weight columns",
                self.metadata.n_class,
                cols,
            ));
        }
        if let Some(pipeline) = &self.pipeline {
            if pipeline.n_output_features() != self.metadata.n_features {
                return Err(LogRegError::mismatch(
                    "artifact pipeline output width",
                    self.metadata.n_features,
                    pipeline.n_output_features(),
                ));
            }
        }
        Ok(())
    }

    /// Width of the raw inputs this artifact expects
    pub fn input_features(&self) -> usize {
        self.pipeline
            .as_ref()
            .map_or(self.metadata.n_features, |p| p.n_input_features)
    }

    /// Apply the stored pipeline to raw inputs; identity when none is stored
    pub fn prepare_features(&self, raw: &Array2<f64>) -> Result<Array2<f64>> {
        match &self.pipeline {
            Some(pipeline) => pipeline.transform(raw),
            None => Ok(raw.clone()),
        }
    }

    pub fn into_one_vs_all(self) -> Result<OneVsAllModel> {
        match self.layout {
            Method::OneVsAll => OneVsAllModel::new(self.weights),
            other => Err(LogRegError::ModelMismatch(format!(
                "expected a one-vs-all artifact, found {other}"
            ))),
        }
    }

    pub fn into_multinomial(self) -> Result<MultinomialModel> {
        match self.layout {
            Method::Multinomial => MultinomialModel::new(self.weights),
            other => Err(LogRegError::ModelMismatch(format!(
                "expected a multinomial artifact, found {other}"
            ))),
        }
    }

    pub fn to_model(&self) -> Result<LinearModel> {
        Ok(match self.layout {
            Method::OneVsAll => OneVsAllModel::new(self.weights.clone())?.into(),
            Method::Multinomial => MultinomialModel::new(self.weights.clone())?.into(),
        })
    }

    /// Print artifact summary
    pub fn print_summary(&self) {
        println!("=== Logistic Regression Model Summary ===");
        println!("Method: {}", self.layout);
        println!("Features: {}", self.metadata.n_features);
        println!("Classes: {}", self.metadata.n_class);
        if let Some(pipeline) = &self.pipeline {
            println!(
                "Input Pipeline: keep {} of {} features, divide by {}",
                pipeline.n_output_features(),
                pipeline.n_input_features,
                pipeline.pixel_scale
            );
        }
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        if let Some(params) = &self.metadata.training_params {
            println!("Training Parameters:");
            println!("  Max Iterations: {}", params.max_iterations);
            println!("  Gradient Tolerance: {:e}", params.gradient_tolerance);
            println!("  Minimizer: {:?}", params.minimizer);
        }
        if let Some(report) = &self.metadata.report {
            println!("Optimizer Runs:");
            for run in &report.runs {
                let target = run
                    .class
                    .map_or_else(|| "all".to_string(), |c| c.to_string());
                println!(
                    "  {:>5}: loss {:.6}, {} iterations, {}",
                    target, run.loss, run.iterations, run.termination
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunSummary;
    use crate::core::Termination;
    use ndarray::array;
    use tempfile::NamedTempFile;

    fn ova() -> LinearModel {
        OneVsAllModel::new(array![[0.5, -0.25, 1.0], [1.0 / 3.0, 2.0, -7.5e-9]])
            .unwrap()
            .into()
    }

    #[test]
    fn test_default_file_names() {
        assert_eq!(default_file_name(Method::OneVsAll), "params.json");
        assert_eq!(default_file_name(Method::Multinomial), "params_bonus.json");
    }

    #[test]
    fn test_round_trip_is_lossless() -> Result<()> {
        let model = ova();
        let report = TrainingReport {
            method: Method::OneVsAll,
            runs: vec![RunSummary {
                class: Some(0),
                loss: 0.125,
                gradient_norm: 1e-6,
                iterations: 12,
                evaluations: 20,
                termination: Termination::Converged,
            }],
        };
        let pipeline = FeaturePipeline {
            n_input_features: 4,
            kept_features: vec![2],
            pixel_scale: 255.0,
        };
        let artifact = WeightArtifact::from_model(&model)
            .with_training(TrainingConfig::default(), report.clone())
            .with_pipeline(pipeline.clone());

        let file = NamedTempFile::new().unwrap();
        artifact.save_to_file(file.path())?;
        let loaded = WeightArtifact::load_from_file(file.path())?;

        assert_eq!(loaded.layout, Method::OneVsAll);
        assert_eq!(&loaded.weights, model.weights());
        assert_eq!(loaded.pipeline, Some(pipeline));
        assert_eq!(loaded.metadata.report, Some(report));
        assert_eq!(loaded.metadata.training_params, Some(TrainingConfig::default()));
        assert_eq!(loaded.input_features(), 4);
        assert_eq!(loaded.to_model()?, model);
        Ok(())
    }

    #[test]
    fn test_layout_mismatch() {
        let artifact = WeightArtifact::from_model(&ova());
        assert!(artifact.clone().into_one_vs_all().is_ok());
        assert!(matches!(
            artifact.into_multinomial(),
            Err(LogRegError::ModelMismatch(_))
        ));

        let multinomial: LinearModel = MultinomialModel::new(Array2::zeros((3, 4))).unwrap().into();
        let artifact = WeightArtifact::from_model(&multinomial);
        assert!(matches!(
            artifact.into_one_vs_all(),
            Err(LogRegError::ModelMismatch(_))
        ));
    }

    #[test]
    fn test_load_rejects_inconsistent_shape() {
        let mut artifact = WeightArtifact::from_model(&ova());
        artifact.metadata.n_features = 5;
        let file = NamedTempFile::new().unwrap();
        artifact.save_to_file(file.path()).unwrap();
        assert!(matches!(
            WeightArtifact::load_from_file(file.path()),
            Err(LogRegError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(
            WeightArtifact::load_from_file(file.path()),
            Err(LogRegError::SerializationError(_))
        ));
        assert!(matches!(
            WeightArtifact::load_from_file("/nonexistent/params.json"),
            Err(LogRegError::IoError(_))
        ));
    }

    #[test]
    fn test_prepare_features() {
        let artifact = WeightArtifact::from_model(&ova());
        let raw = array![[3.0]];
        assert_eq!(artifact.prepare_features(&raw).unwrap(), raw);

        let artifact = artifact.with_pipeline(FeaturePipeline {
            n_input_features: 2,
            kept_features: vec![1],
            pixel_scale: 2.0,
        });
        assert_eq!(artifact.prepare_features(&array![[9.0, 4.0]]).unwrap(), array![[2.0]]);
    }
}
