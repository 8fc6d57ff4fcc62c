//! Core type definitions for logistic regression

use crate::core::{LogRegError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digit classes in the MNIST setting
pub const DEFAULT_N_CLASS: usize = 10;

/// Classifier family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// K independent binary classifiers, one per class
    OneVsAll,
    /// One joint softmax model over all K classes
    Multinomial,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::OneVsAll => write!(f, "one-vs-all"),
            Method::Multinomial => write!(f, "multinomial"),
        }
    }
}

/// Optimizer backend selection
///
/// Every backend is an `argmin` solver paired with a More-Thuente line
/// search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MinimizerKind {
    /// Nonlinear conjugate gradient with the Polak-Ribiere+ update
    ConjugateGradient,
    /// Limited-memory BFGS
    Lbfgs,
    /// Steepest descent
    SteepestDescent,
}

impl fmt::Display for MinimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimizerKind::ConjugateGradient => write!(f, "conjugate gradient"),
            MinimizerKind::Lbfgs => write!(f, "L-BFGS"),
            MinimizerKind::SteepestDescent => write!(f, "steepest descent"),
        }
    }
}

impl Default for MinimizerKind {
    fn default() -> Self {
        Self::ConjugateGradient
    }
}

/// Why a minimizer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// Gradient infinity norm fell below the tolerance
    Converged,
    /// Iteration budget exhausted
    MaxIterations,
    /// The solver aborted, usually because the line search found no
    /// acceptable step
    LineSearchFailed,
    /// The solver's own stopping rule fired before the gradient tolerance
    /// was met
    Stalled,
    /// The loss became non-finite; the best finite iterate is kept
    Diverged,
}

impl Termination {
    pub fn is_converged(&self) -> bool {
        matches!(self, Termination::Converged)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::MaxIterations => write!(f, "max iterations reached"),
            Termination::LineSearchFailed => write!(f, "line search failed"),
            Termination::Stalled => write!(f, "stalled"),
            Termination::Diverged => write!(f, "diverged"),
        }
    }
}

/// Result of a minimizer run
#[derive(Debug, Clone)]
pub struct MinimizeResult {
    /// Best parameters found
    pub params: Array1<f64>,
    /// Loss at `params`
    pub loss: f64,
    /// Infinity norm of the gradient at `params`
    pub gradient_norm: f64,
    /// Number of completed iterations. When the solver aborts this counts
    /// the iterates that lowered the loss instead.
    pub iterations: usize,
    /// Number of objective evaluations, line search included
    pub evaluations: usize,
    pub termination: Termination,
}

/// Training configuration threaded through every trainer call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of classes K; labels must lie in 0..K
    pub n_class: usize,
    /// Iteration budget per minimizer run
    pub max_iterations: usize,
    /// Stop once the gradient infinity norm is at most this value
    pub gradient_tolerance: f64,
    pub minimizer: MinimizerKind,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_class: DEFAULT_N_CLASS,
            max_iterations: 100,
            gradient_tolerance: 1e-5,
            minimizer: MinimizerKind::ConjugateGradient,
        }
    }
}

impl TrainingConfig {
    /// Check that every field is usable before any training starts
    pub fn validate(&self) -> Result<()> {
        if self.n_class < 2 {
            return Err(LogRegError::InvalidParameter(format!(
                "n_class must be at least 2, got {}",
                self.n_class
            )));
        }
        if self.max_iterations == 0 {
            return Err(LogRegError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        if !self.gradient_tolerance.is_finite() || self.gradient_tolerance <= 0.0 {
            return Err(LogRegError::InvalidParameter(format!(
                "gradient_tolerance must be a positive, finite number, got {}",
                self.gradient_tolerance
            )));
        }
        Ok(())
    }
}
