//! Synthetic labeled datasets for tests, benchmarks and the demo command

use crate::core::{LogRegError, Result};
use crate::data::LabeledMatrix;
use ndarray::{s, Array, Array1, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{
    rand::{rngs::StdRng, Rng, SeedableRng},
    rand_distr::Normal,
    RandomExt,
};

/// Sample `per_class` Gaussian points around each row of `centers`
///
/// Row `k` of `centers` is the mean of class `k`; the output is ordered by
/// class, `per_class` rows at a time.
pub fn gaussian_blobs(
    per_class: usize,
    centers: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    std_dev: f64,
    rng: &mut impl Rng,
) -> Result<LabeledMatrix> {
    let (n_class, n_features) = centers.dim();
    if n_class == 0 || per_class == 0 {
        return Err(LogRegError::EmptyDataset);
    }
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(LogRegError::InvalidParameter(format!(
            "std_dev must be a non-negative, finite number, got {std_dev}"
        )));
    }
    let noise = Normal::new(0.0, std_dev)
        .map_err(|e| LogRegError::InvalidParameter(format!("std_dev {std_dev}: {e}")))?;

    let mut features = Array2::zeros((n_class * per_class, n_features));
    for (class, center) in centers.rows().into_iter().enumerate() {
        let blob: Array2<f64> = Array::random_using((per_class, n_features), noise, rng);
        features
            .slice_mut(s![class * per_class..(class + 1) * per_class, ..])
            .assign(&(blob + &center));
    }
    let labels: Array1<usize> = (0..n_class * per_class).map(|i| i / per_class).collect();
    LabeledMatrix::new(features, labels)
}

/// Well separated centers: class `k` sits at `spread` along axis `k`
pub fn axis_centers(n_class: usize, spread: f64) -> Array2<f64> {
    Array2::eye(n_class) * spread
}

/// Seeded `n_class`-blob dataset in `n_class` dimensions with unit noise
pub fn seeded_blobs(n_class: usize, per_class: usize, seed: u64) -> Result<LabeledMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    gaussian_blobs(per_class, &axis_centers(n_class, 6.0), 1.0, &mut rng)
}
