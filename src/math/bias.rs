//! Bias column augmentation

use ndarray::{s, Array2, ArrayBase, Data, Ix2};
use std::ops::Deref;

/// Prepend a column of ones: N x D becomes N x (D + 1)
///
/// Callers pass the raw feature matrix; passing an already augmented
/// matrix yields two bias columns.
pub fn add_bias_column<S>(features: &ArrayBase<S, Ix2>) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    let (n_samples, n_features) = features.dim();
    let mut augmented = Array2::ones((n_samples, n_features + 1));
    augmented.slice_mut(s![.., 1..]).assign(features);
    augmented
}

/// Feature matrix that already carries its bias column
///
/// Training runs build one of these up front and hand it to every
/// objective evaluation, so the ones-column is concatenated once per run
/// instead of once per evaluation. The only way to build one is from the
/// raw features, which rules out a double bias column.
#[derive(Debug, Clone)]
pub struct AugmentedFeatures(Array2<f64>);

impl AugmentedFeatures {
    pub fn new<S>(features: &ArrayBase<S, Ix2>) -> Self
    where
        S: Data<Elem = f64>,
    {
        Self(add_bias_column(features))
    }

    /// Number of rows N
    pub fn n_samples(&self) -> usize {
        self.0.nrows()
    }

    /// Number of columns D + 1
    pub fn n_params(&self) -> usize {
        self.0.ncols()
    }
}

impl Deref for AugmentedFeatures {
    type Target = Array2<f64>;

    fn deref(&self) -> &Array2<f64> {
        &self.0
    }
}
