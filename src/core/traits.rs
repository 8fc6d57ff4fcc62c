//! Core traits for logistic regression
//!
//! These are the seams between the objectives, the optimizer backends and
//! the trained models. An objective never knows which minimizer drives it,
//! and a minimizer never knows which loss it is minimizing.

use crate::core::{MinimizeResult, Result};
use ndarray::{Array1, Array2};

/// A differentiable scalar loss over a flat parameter vector
pub trait Objective {
    /// Number of parameters the objective expects
    fn n_params(&self) -> usize;

    /// Compute the loss and its gradient at `params` in a single pass
    fn evaluate(&self, params: &Array1<f64>) -> Result<(f64, Array1<f64>)>;
}

/// Unconstrained minimizer driven only by loss and gradient evaluations
///
/// Implementations must return the best iterate seen even when they stop
/// without converging; non-convergence is reported through
/// [`MinimizeResult::termination`], never as an error.
pub trait Minimizer {
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Array1<f64>,
        max_iterations: usize,
    ) -> Result<MinimizeResult>;
}

/// Trained multi-class model
pub trait Classifier {
    /// Raw per-class scores, shape N x K
    fn scores(&self, features: &Array2<f64>) -> Result<Array2<f64>>;

    /// Predicted class index per row
    fn predict(&self, features: &Array2<f64>) -> Result<Array1<usize>>;

    /// Number of input features (without the bias column)
    fn n_features(&self) -> usize;

    /// Number of classes
    fn n_class(&self) -> usize;
}
