//! Optimizer diagnostics collected during training

use crate::core::{MinimizeResult, Method, Termination};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Outcome of one minimizer run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Class trained by this run; `None` for the joint multinomial run
    pub class: Option<usize>,
    pub loss: f64,
    pub gradient_norm: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub termination: Termination,
}

impl RunSummary {
    pub(crate) fn record(class: Option<usize>, result: &MinimizeResult) -> Self {
        let summary = Self {
            class,
            loss: result.loss,
            gradient_norm: result.gradient_norm,
            iterations: result.iterations,
            evaluations: result.evaluations,
            termination: result.termination,
        };
        summary.log();
        summary
    }

    fn log(&self) {
        let target = match self.class {
            Some(class) => format!("class {class}"),
            None => "multinomial model".to_string(),
        };
        info!(
            "Trained {target}: loss={:.6} |g|inf={:.3e} iterations={} evaluations={} ({})",
            self.loss, self.gradient_norm, self.iterations, self.evaluations, self.termination
        );
        if !self.termination.is_converged() {
            warn!("Optimizer for {target} stopped without converging: {}", self.termination);
        }
    }
}

/// Diagnostics for a whole training call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub method: Method,
    pub runs: Vec<RunSummary>,
}

impl TrainingReport {
    /// True when every minimizer run converged
    pub fn all_converged(&self) -> bool {
        self.runs.iter().all(|run| run.termination.is_converged())
    }

    pub fn total_iterations(&self) -> usize {
        self.runs.iter().map(|run| run.iterations).sum()
    }

    /// Mean final loss over all runs
    pub fn mean_loss(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(|run| run.loss).sum::<f64>() / self.runs.len() as f64
    }
}
