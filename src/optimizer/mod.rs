//! Optimizer backends for the logistic regression objectives
//!
//! Every backend implements [`Minimizer`] on top of an `argmin` solver, so
//! trainers can swap conjugate gradient for L-BFGS or steepest descent
//! without touching objective code.

pub mod conjugate_gradient;
pub mod lbfgs;
mod problem;
pub mod steepest_descent;

pub use self::conjugate_gradient::*;
pub use self::lbfgs::*;
pub use self::steepest_descent::*;

use crate::core::{LogRegError, Minimizer, MinimizerKind, Objective, Result, TrainingConfig};
use ndarray::Array1;

/// Build the minimizer selected by a training configuration
pub fn minimizer_for(config: &TrainingConfig) -> Box<dyn Minimizer> {
    match config.minimizer {
        MinimizerKind::ConjugateGradient => {
            Box::new(ConjugateGradient::new(config.gradient_tolerance))
        }
        MinimizerKind::Lbfgs => Box::new(Lbfgs::new(config.gradient_tolerance)),
        MinimizerKind::SteepestDescent => {
            Box::new(SteepestDescent::new(config.gradient_tolerance))
        }
    }
}

/// Largest absolute component
pub fn inf_norm(values: &Array1<f64>) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// Reject a starting point the objective cannot use
pub(crate) fn check_initial(objective: &dyn Objective, initial: &Array1<f64>) -> Result<()> {
    if initial.len() != objective.n_params() {
        return Err(LogRegError::mismatch(
            "initial parameters",
            objective.n_params(),
            initial.len(),
        ));
    }
    if initial.iter().any(|v| !v.is_finite()) {
        return Err(LogRegError::NonFiniteInput(
            "initial parameters must be finite".to_string(),
        ));
    }
    Ok(())
}

/// Solver construction failures, such as rejected line search constants
pub(crate) fn solver_error(err: argmin::core::Error) -> LogRegError {
    LogRegError::OptimizerError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::AugmentedFeatures;
    use crate::objective::OneVsAllObjective;
    use ndarray::array;

    #[test]
    fn test_inf_norm() {
        assert_eq!(inf_norm(&array![1.0, -3.0, 2.0]), 3.0);
        assert_eq!(inf_norm(&Array1::zeros(0)), 0.0);
    }

    #[test]
    fn test_minimizer_for_each_kind() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let labels = array![0.0, 0.0, 1.0, 1.0];
        let augmented = AugmentedFeatures::new(&x);
        let objective = OneVsAllObjective::new(&augmented, labels).unwrap();

        for kind in [
            MinimizerKind::ConjugateGradient,
            MinimizerKind::Lbfgs,
            MinimizerKind::SteepestDescent,
        ] {
            let config = TrainingConfig {
                minimizer: kind,
                ..TrainingConfig::default()
            };
            let result = minimizer_for(&config)
                .minimize(&objective, Array1::zeros(2), 50)
                .unwrap();
            assert!(result.loss < std::f64::consts::LN_2);
            assert!(result.params[1] > 0.0);
        }
    }

    #[test]
    fn test_non_finite_start_rejected() {
        let x = array![[0.0], [1.0]];
        let augmented = AugmentedFeatures::new(&x);
        let objective = OneVsAllObjective::new(&augmented, array![0.0, 1.0]).unwrap();
        let result = ConjugateGradient::default().minimize(&objective, array![f64::NAN, 0.0], 10);
        assert!(matches!(result, Err(LogRegError::NonFiniteInput(_))));
    }
}
