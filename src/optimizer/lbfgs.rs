//! Limited-memory BFGS

use crate::core::{Minimizer, MinimizeResult, Objective, Result};
use crate::optimizer::problem::{finish_run, ArgminObjective, RunTracker, SolverOutcome};
use crate::optimizer::{check_initial, solver_error};
use argmin::core::{Executor, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use log::debug;
use ndarray::Array1;
use std::cell::RefCell;

/// L-BFGS with a More-Thuente line search
///
/// `memory` is the number of correction pairs kept for the inverse Hessian
/// approximation.
#[derive(Debug, Clone)]
pub struct Lbfgs {
    gradient_tolerance: f64,
    memory: usize,
}

impl Lbfgs {
    pub fn new(gradient_tolerance: f64) -> Self {
        Self {
            gradient_tolerance,
            memory: 10,
        }
    }

    pub fn with_memory(mut self, memory: usize) -> Self {
        self.memory = memory.max(1);
        self
    }
}

impl Default for Lbfgs {
    fn default() -> Self {
        Self::new(1e-5)
    }
}

impl Minimizer for Lbfgs {
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

        let solver = LBFGS::new(MoreThuenteLineSearch::new(), self.memory)
            .with_tolerance_grad(self.gradient_tolerance)
            .map_err(solver_error)?;

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
            "L-BFGS: loss={:.6e} |g|inf={:.3e} after {} iterations ({})",
            result.loss, result.gradient_norm, result.iterations, result.termination
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogRegError, Termination};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// Rosenbrock banana function
    struct Rosenbrock;

    impl Objective for Rosenbrock {
        fn n_params(&self) -> usize {
            2
        }

        fn evaluate(&self, p: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
            let (x, y) = (p[0], p[1]);
            let loss = (1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2);
            let gradient = array![
                -2.0 * (1.0 - x) - 400.0 * x * (y - x * x),
                200.0 * (y - x * x)
            ];
            Ok((loss, gradient))
        }
    }

    #[test]
    fn test_minimizes_rosenbrock() {
        let result = Lbfgs::new(1e-6)
            .minimize(&Rosenbrock, array![-1.2, 1.0], 500)
            .unwrap();
        assert_abs_diff_eq!(result.params[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.params[1], 1.0, epsilon = 1e-3);
        assert!(result.loss < 1e-6);
        assert!(result.iterations < 500);
    }

    #[test]
    fn test_single_iteration_budget() {
        let result = Lbfgs::default()
            .with_memory(3)
            .minimize(&Rosenbrock, array![-1.2, 1.0], 1)
            .unwrap();
        assert_eq!(result.termination, Termination::MaxIterations);
        assert_eq!(result.iterations, 1);
        assert!(result.loss < 24.2);
    }

    #[test]
    fn test_objective_errors_propagate() {
        struct Broken;

        impl Objective for Broken {
            fn n_params(&self) -> usize {
                1
            }

            fn evaluate(&self, params: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
                if params[0] == 0.0 {
                    Ok((1.0, array![1.0]))
                } else {
                    Err(LogRegError::InvalidParameter("broken objective".to_string()))
                }
            }
        }

        let result = Lbfgs::default().minimize(&Broken, array![0.0], 10);
        assert!(matches!(result, Err(LogRegError::InvalidParameter(_))));
    }
}
