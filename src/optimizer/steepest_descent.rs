//! Steepest descent with a line search

use crate::core::{Minimizer, MinimizeResult, Objective, Result};
use crate::optimizer::check_initial;
use crate::optimizer::problem::{finish_run, ArgminObjective, RunTracker, SolverOutcome};
use argmin::core::{Executor, State};
use argmin::solver::gradientdescent::SteepestDescent as ArgminSteepestDescent;
use argmin::solver::linesearch::MoreThuenteLineSearch;
use ndarray::Array1;
use std::cell::RefCell;

/// Moves along the negative gradient, step length chosen by a More-Thuente
/// line search
#[derive(Debug, Clone)]
pub struct SteepestDescent {
    gradient_tolerance: f64,
}

impl SteepestDescent {
    pub fn new(gradient_tolerance: f64) -> Self {
        Self { gradient_tolerance }
    }
}

impl Default for SteepestDescent {
    fn default() -> Self {
        Self::new(1e-5)
    }
}

impl Minimizer for SteepestDescent {
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

        let solver = ArgminSteepestDescent::new(MoreThuenteLineSearch::new());
        let outcome = match Executor::new(problem, solver)
            .configure(|state| state.param(initial).max_iters(max_iterations as u64))
            .run()
        {
            Ok(result) => SolverOutcome::Finished {
                iterations: result.state().get_iter(),
            },
            Err(err) => SolverOutcome::Aborted(err),
        };

        finish_run(
            tracker.into_inner(),
            outcome,
            max_iterations,
            self.gradient_tolerance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Termination;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// 0.5 * ((x - 1)² + 2 (y + 3)²)
    struct Valley;

    impl Objective for Valley {
        fn n_params(&self) -> usize {
            2
        }

        fn evaluate(&self, p: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
            let (dx, dy) = (p[0] - 1.0, p[1] + 3.0);
            Ok((0.5 * (dx * dx + 2.0 * dy * dy), array![dx, 2.0 * dy]))
        }
    }

    #[test]
    fn test_minimizes_valley() {
        let result = SteepestDescent::new(1e-6)
            .minimize(&Valley, array![0.0, 0.0], 500)
            .unwrap();
        assert_eq!(result.termination, Termination::Converged);
        assert_abs_diff_eq!(result.params, array![1.0, -3.0], epsilon = 1e-5);
    }

    #[test]
    fn test_loss_decreases_within_budget() {
        let result = SteepestDescent::default()
            .minimize(&Valley, array![10.0, 10.0], 2)
            .unwrap();
        assert!(result.loss < 0.5 * (81.0 + 2.0 * 169.0));
        assert!(result.iterations <= 2);
    }
}
