//! Feature preprocessing utilities
//!
//! The preprocessing fitted on the training partition is captured in a
//! [`FeaturePipeline`] so the exact same column filter and scale can be
//! replayed on validation, test and prediction inputs.

use crate::core::{LogRegError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Near-constant feature removal
pub mod feature_selection {
    use super::*;

    /// Population standard deviation of every column
    pub fn column_std(features: &Array2<f64>) -> Result<Array1<f64>> {
        if features.nrows() == 0 {
            return Err(LogRegError::EmptyDataset);
        }
        Ok(features.std_axis(Axis(0), 0.0))
    }

    /// Indices of columns whose standard deviation exceeds `threshold`
    pub fn select_by_std(features: &Array2<f64>, threshold: f64) -> Result<Vec<usize>> {
        let std = column_std(features)?;
        let kept: Vec<usize> = std
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s > threshold)
            .map(|(i, _)| i)
            .collect();

        if kept.is_empty() {
            return Err(LogRegError::InvalidParameter(format!(
                "no feature has standard deviation above {threshold}"
            )));
        }
        let dropped = std.len() - kept.len();
        if dropped > 0 {
            log::info!(
                "Dropping {} of {} features with std <= {}",
                dropped,
                std.len(),
                threshold
            );
        }
        Ok(kept)
    }
}

/// Fixed-divisor feature scaling
pub mod scaling {
    use super::*;

    pub fn validate_scale(scale: f64) -> Result<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(LogRegError::InvalidParameter(format!(
                "scale must be a positive, finite number, got {scale}"
            )));
        }
        Ok(())
    }

    /// Divide every entry by `scale`
    pub fn scale_features(mut features: Array2<f64>, scale: f64) -> Result<Array2<f64>> {
        validate_scale(scale)?;
        if scale != 1.0 {
            features.mapv_inplace(|v| v / scale);
        }
        Ok(features)
    }
}

/// Column filter followed by a division, fitted once on training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePipeline {
    /// Width of the raw input the filter indexes into
    pub n_input_features: usize,
    /// Raw column indices kept, in ascending order
    pub kept_features: Vec<usize>,
    pub pixel_scale: f64,
}

impl FeaturePipeline {
    /// Fit the column filter on `features` (raw, unscaled)
    pub fn fit(features: &Array2<f64>, variance_threshold: f64, pixel_scale: f64) -> Result<Self> {
        scaling::validate_scale(pixel_scale)?;
        let kept_features = feature_selection::select_by_std(features, variance_threshold)?;
        Ok(Self {
            n_input_features: features.ncols(),
            kept_features,
            pixel_scale,
        })
    }

    /// Pipeline that keeps every column and leaves values untouched
    pub fn identity(n_features: usize) -> Self {
        Self {
            n_input_features: n_features,
            kept_features: (0..n_features).collect(),
            pixel_scale: 1.0,
        }
    }

    pub fn n_output_features(&self) -> usize {
        self.kept_features.len()
    }

    pub fn is_identity(&self) -> bool {
        self.pixel_scale == 1.0
            && self.kept_features.len() == self.n_input_features
            && self.kept_features.iter().enumerate().all(|(i, &k)| i == k)
    }

    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.n_input_features {
            return Err(LogRegError::mismatch(
                "raw feature width",
                self.n_input_features,
                features.ncols(),
            ));
        }
        if let Some(&bad) = self.kept_features.iter().find(|&&k| k >= self.n_input_features) {
            return Err(LogRegError::InvalidParameter(format!(
                "kept feature index {bad} out of range for {} inputs",
                self.n_input_features
            )));
        }
        let selected = features.select(Axis(1), &self.kept_features);
        scaling::scale_features(selected, self.pixel_scale)
    }
}
