//! Logistic regression loss functions
//!
//! Both objectives compute the negative mean log-likelihood and its
//! gradient in one pass. The free functions take the raw feature matrix
//! and augment it on every call; the [`Objective`](crate::core::Objective)
//! implementations borrow an [`AugmentedFeatures`](crate::math::AugmentedFeatures)
//! built once per training run.

pub mod binary;
pub mod multinomial;

pub use self::binary::*;
pub use self::multinomial::*;

use crate::core::{LogRegError, Result};
use ndarray::{ArrayBase, Data, Ix2};

/// Shape checks shared by both objectives, run before any matrix product
pub(crate) fn check_design<S>(
    features: &ArrayBase<S, Ix2>,
    n_params_rows: usize,
    n_targets: usize,
) -> Result<()>
where
    S: Data<Elem = f64>,
{
    let (n_samples, n_features) = features.dim();
    if n_samples == 0 {
        return Err(LogRegError::EmptyDataset);
    }
    if n_params_rows != n_features + 1 {
        return Err(LogRegError::mismatch(
            "weight rows (features + bias)",
            n_features + 1,
            n_params_rows,
        ));
    }
    if n_targets != n_samples {
        return Err(LogRegError::mismatch("label rows", n_samples, n_targets));
    }
    Ok(())
}

/// Central finite-difference gradient, used to validate analytic gradients
#[cfg(test)]
pub(crate) fn numerical_gradient<F>(f: F, params: &ndarray::Array1<f64>, step: f64) -> ndarray::Array1<f64>
where
    F: Fn(&ndarray::Array1<f64>) -> f64,
{
    let mut gradient = ndarray::Array1::zeros(params.len());
    let mut shifted = params.clone();
    for i in 0..params.len() {
        shifted[i] = params[i] + step;
        let upper = f(&shifted);
        shifted[i] = params[i] - step;
        let lower = f(&shifted);
        shifted[i] = params[i];
        gradient[i] = (upper - lower) / (2.0 * step);
    }
    gradient
}
