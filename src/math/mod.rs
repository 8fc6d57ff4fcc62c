//! Numeric primitives shared by the objectives and the predictors
//!
//! Everything in here is a pure function of its inputs: no caching, no
//! interior state.

pub mod bias;
pub mod labels;
pub mod sigmoid;
pub mod softmax;

pub use self::bias::*;
pub use self::labels::*;
pub use self::sigmoid::*;
pub use self::softmax::*;

use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};

/// Probabilities are clipped to `[PROBABILITY_EPSILON, 1 - PROBABILITY_EPSILON]`
/// before taking a logarithm.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Clip a probability into the open interval used for log-likelihoods
#[inline]
pub fn clip_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON)
}

/// Index of the largest entry, first occurrence wins
///
/// NaN entries never win. An all-NaN (or empty) row yields 0.
pub fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &value) in row.iter().enumerate() {
        if value > best_value {
            best_value = value;
            best_index = i;
        }
    }
    best_index
}

/// Row-wise [`argmax`] of an N x K score matrix
pub fn argmax_rows<S>(scores: &ArrayBase<S, Ix2>) -> Array1<usize>
where
    S: Data<Elem = f64>,
{
    scores.rows().into_iter().map(argmax).collect()
}
