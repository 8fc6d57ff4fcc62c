//! Nonlinear conjugate gradient (Polak-Ribiere+)

use crate::core::{Minimizer, MinimizeResult, Objective, Result};
use crate::optimizer::problem::{finish_run, ArgminObjective, RunTracker, SolverOutcome};
use crate::optimizer::{check_initial, solver_error};
use argmin::core::{Executor, State};
use argmin::solver::conjugategradient::{beta::PolakRibierePlus, NonlinearConjugateGradient};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use log::debug;
use ndarray::Array1;
use std::cell::RefCell;

/// Sufficient decrease constant of the line search
const LINE_SEARCH_C1: f64 = 1e-4;
/// Curvature constant of the line search
const LINE_SEARCH_C2: f64 = 0.1;

/// Conjugate gradient minimizer using only loss and gradient evaluations
///
/// Directions follow the Polak-Ribiere+ rule, which falls back to steepest
/// descent whenever beta would be negative. The direction is also reset
/// every `restart_iterations` steps and whenever consecutive gradients stop
/// being close to orthogonal.
#[derive(Debug, Clone)]
pub struct ConjugateGradient {
    gradient_tolerance: f64,
    restart_iterations: u64,
}

impl ConjugateGradient {
    pub fn new(gradient_tolerance: f64) -> Self {
        Self {
            gradient_tolerance,
            restart_iterations: 10,
        }
    }

    pub fn with_restart_iterations(mut self, restart_iterations: u64) -> Self {
        self.restart_iterations = restart_iterations.max(1);
        self
    }

    pub fn gradient_tolerance(&self) -> f64 {
        self.gradient_tolerance
    }
}

impl Default for ConjugateGradient {
    fn default() -> Self {
        Self::new(1e-5)
    }
}

impl Minimizer for ConjugateGradient {
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Array1<f64>,
        max_iterations: usize,
    ) -> Result<MinimizeResult> {
        check_initial(objective, &initial)?;

        let tracker = RefCell::new(RunTracker::default());
        let problem = ArgminObjective::new(objective, &tracker);
        if let Some(result) = problem.start(&initial, self.gradient_tolerance)? {
            return Ok(result);
        }

        let line_search = MoreThuenteLineSearch::new()
            .with_c(LINE_SEARCH_C1, LINE_SEARCH_C2)
            .map_err(solver_error)?;
        let solver = NonlinearConjugateGradient::new(line_search, PolakRibierePlus::new())
            .restart_iters(self.restart_iterations)
            .restart_orthogonality(0.1);

        let outcome = match Executor::new(problem, solver)
            .configure(|state| state.param(initial).max_iters(max_iterations as u64))
            .run()
        {
            Ok(result) => SolverOutcome::Finished {
                iterations: result.state().get_iter(),
            },
            Err(err) => SolverOutcome::Aborted(err),
        };

        let result = finish_run(
            tracker.into_inner(),
            outcome,
            max_iterations,
            self.gradient_tolerance,
        )?;
        debug!(
            "conjugate gradient: loss={:.6e} |g|inf={:.3e} after {} iterations ({})",
            result.loss, result.gradient_norm, result.iterations, result.termination
        );
        Ok(result)
    }
}
