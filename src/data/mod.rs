//! Data loading and partitioning
//!
//! Every loader produces a [`LabeledMatrix`]: a dense N x D feature matrix
//! with one class index per row. Preprocessing into train / validation /
//! test partitions lives in [`split`].

pub mod csv;
pub mod idx;
pub mod split;
pub mod synthetic;

pub use self::csv::CsvDigits;
pub use self::split::{preprocess, Partitions, PreprocessConfig};
pub use self::synthetic::gaussian_blobs;

use crate::core::{LogRegError, Result};
use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};

/// Dense features with one class label per row
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    pub features: Array2<f64>,
    pub labels: Array1<usize>,
}

impl LabeledMatrix {
    pub fn new(features: Array2<f64>, labels: Array1<usize>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(LogRegError::mismatch(
                "labeled matrix rows",
                features.nrows(),
                labels.len(),
            ));
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Row indices carrying `class`, in file order
    pub fn class_rows(&self, class: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect()
    }

    /// Largest label plus one, or 0 for an empty matrix
    pub fn observed_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |&max| max + 1)
    }

    /// Copy of the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), rows),
            labels: rows.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Copy restricted to the given feature columns
    pub fn select_features(&self, columns: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(1), columns),
            labels: self.labels.clone(),
        }
    }

    /// Stack several matrices with the same width on top of each other
    pub fn concat(parts: &[LabeledMatrix]) -> Result<Self> {
        let width = match parts.first() {
            Some(first) => first.n_features(),
            None => return Err(LogRegError::EmptyDataset),
        };
        for part in parts {
            if part.n_features() != width {
                return Err(LogRegError::mismatch(
                    "concatenated feature width",
                    width,
                    part.n_features(),
                ));
            }
        }

        let views: Vec<ArrayView2<f64>> = parts.iter().map(|p| p.features.view()).collect();
        let features = concatenate(Axis(0), &views)
            .map_err(|e| LogRegError::InvalidParameter(e.to_string()))?;
        let labels = parts
            .iter()
            .flat_map(|p| p.labels.iter().copied())
            .collect();
        Ok(Self { features, labels })
    }
}
