//! Label encodings for the two objective families

use crate::core::{LogRegError, Result};
use ndarray::{Array1, Array2};

/// Fail with [`LogRegError::InvalidLabel`] on the first label outside `0..n_class`
pub fn validate_labels(labels: &Array1<usize>, n_class: usize) -> Result<()> {
    match labels.iter().find(|&&label| label >= n_class) {
        Some(&label) => Err(LogRegError::InvalidLabel { label, n_class }),
        None => Ok(()),
    }
}

/// N x K one-hot matrix; every row sums to exactly one
pub fn one_hot(labels: &Array1<usize>, n_class: usize) -> Result<Array2<f64>> {
    validate_labels(labels, n_class)?;
    let mut encoded = Array2::zeros((labels.len(), n_class));
    for (i, &label) in labels.iter().enumerate() {
        encoded[[i, label]] = 1.0;
    }
    Ok(encoded)
}

/// Binary target for one class of a one-vs-all model: 1.0 where `label == class`
pub fn binary_labels(labels: &Array1<usize>, class: usize) -> Array1<f64> {
    labels.mapv(|label| if label == class { 1.0 } else { 0.0 })
}
