//! Train / validation / test partitioning and feature preprocessing

use crate::core::{LogRegError, Result, DEFAULT_N_CLASS};
use crate::data::LabeledMatrix;
use crate::math::validate_labels;
use crate::utils::FeaturePipeline;
use serde::{Deserialize, Serialize};

/// Preprocessing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub n_class: usize,
    /// Leading rows of each class moved from the training pool to validation
    pub n_validation_per_class: usize,
    /// Features whose training std is at most this value are dropped
    pub variance_threshold: f64,
    /// Divisor applied after filtering
    pub pixel_scale: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            n_class: DEFAULT_N_CLASS,
            n_validation_per_class: 1000,
            variance_threshold: 0.001,
            pixel_scale: 255.0,
        }
    }
}

/// Preprocessed partitions, all in the same (filtered, scaled) feature space
#[derive(Debug, Clone)]
pub struct Partitions {
    pub train: LabeledMatrix,
    pub validation: LabeledMatrix,
    pub test: LabeledMatrix,
    /// Filter and scale fitted on the training partition
    pub pipeline: FeaturePipeline,
}

impl Partitions {
    pub fn kept_features(&self) -> &[usize] {
        &self.pipeline.kept_features
    }
}

/// Rows of each class in class order, preserving file order within a class
fn group_by_class(data: &LabeledMatrix, n_class: usize) -> Vec<Vec<usize>> {
    (0..n_class).map(|class| data.class_rows(class)).collect()
}

/// Split the training pool, filter near-constant features and scale
///
/// The first `n_validation_per_class` rows of every class become the
/// validation partition; the remaining rows become the training partition.
/// Both are ordered by class, as is the test partition. The feature filter
/// is fitted on the training partition only and applied to all three.
pub fn preprocess(
    train_pool: &LabeledMatrix,
    test: &LabeledMatrix,
    config: &PreprocessConfig,
) -> Result<Partitions> {
    if config.n_class < 2 {
        return Err(LogRegError::InvalidParameter(format!(
            "n_class must be at least 2, got {}",
            config.n_class
        )));
    }
    if train_pool.is_empty() {
        return Err(LogRegError::EmptyDataset);
    }
    if test.n_features() != train_pool.n_features() {
        return Err(LogRegError::mismatch(
            "test feature width",
            train_pool.n_features(),
            test.n_features(),
        ));
    }
    validate_labels(&train_pool.labels, config.n_class)?;
    validate_labels(&test.labels, config.n_class)?;

    let mut validation_rows = Vec::new();
    let mut train_rows = Vec::new();
    for (class, rows) in group_by_class(train_pool, config.n_class).into_iter().enumerate() {
        if rows.len() < config.n_validation_per_class {
            return Err(LogRegError::InvalidParameter(format!(
                "class {class} has {} training rows, fewer than the {} validation rows requested",
                rows.len(),
                config.n_validation_per_class
            )));
        }
        let (held_out, rest) = rows.split_at(config.n_validation_per_class);
        validation_rows.extend_from_slice(held_out);
        train_rows.extend_from_slice(rest);
    }
    if train_rows.is_empty() {
        return Err(LogRegError::EmptyDataset);
    }
    let test_rows: Vec<usize> = group_by_class(test, config.n_class)
        .into_iter()
        .flatten()
        .collect();

    let train = train_pool.select_rows(&train_rows);
    let validation = train_pool.select_rows(&validation_rows);
    let test = test.select_rows(&test_rows);

    let pipeline = FeaturePipeline::fit(
        &train.features,
        config.variance_threshold,
        config.pixel_scale,
    )?;
    log::info!(
        "Partitioned {} train, {} validation, {} test rows; keeping {} of {} features",
        train.len(),
        validation.len(),
        test.len(),
        pipeline.n_output_features(),
        pipeline.n_input_features
    );

    let apply = |part: LabeledMatrix| -> Result<LabeledMatrix> {
        let features = pipeline.transform(&part.features)?;
        LabeledMatrix::new(features, part.labels)
    };
    Ok(Partitions {
        train: apply(train)?,
        validation: apply(validation)?,
        test: apply(test)?,
        pipeline,
    })
}
