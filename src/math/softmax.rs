//! Row-wise softmax

use ndarray::{Array2, ArrayBase, Axis, Data, Ix2};

/// Row-wise softmax of an N x K logit matrix
///
/// The row maximum is subtracted before exponentiating, so every exponent
/// is at most zero and the sum is at least one.
pub fn softmax_rows<S>(logits: &ArrayBase<S, Ix2>) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    let mut probabilities = logits.to_owned();
    for mut row in probabilities.axis_iter_mut(Axis(0)) {
        let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let max = if max.is_finite() { max } else { 0.0 };
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    probabilities
}
