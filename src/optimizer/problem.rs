//! Bridge from [`Objective`] to the `argmin` problem traits
//!
//! `argmin` asks for the cost and the gradient through separate calls,
//! usually at the same point. The bridge evaluates the objective once per
//! point and answers the second call from a one-entry cache. It also keeps
//! the lowest-loss point seen, so a run that aborts inside the solver still
//! has an iterate to return.

use crate::core::{LogRegError, MinimizeResult, Objective, Result, Termination};
use crate::optimizer::inf_norm;
use argmin::core::{CostFunction, Error as ArgminError, Gradient};
use log::{debug, warn};
use ndarray::Array1;
use std::cell::RefCell;

#[derive(Debug, Clone)]
struct Evaluation {
    params: Array1<f64>,
    loss: f64,
    gradient: Array1<f64>,
}

/// Bookkeeping shared between the bridge and the minimizer that owns it
#[derive(Debug, Default)]
pub(crate) struct RunTracker {
    last: Option<Evaluation>,
    best: Option<Evaluation>,
    evaluations: usize,
    improvements: usize,
    saw_non_finite: bool,
    failure: Option<LogRegError>,
}

impl RunTracker {
    fn record(&mut self, evaluation: Evaluation) {
        self.evaluations += 1;
        if !evaluation.loss.is_finite() {
            self.saw_non_finite = true;
        } else if self.best.as_ref().map_or(true, |best| evaluation.loss < best.loss) {
            if self.best.is_some() {
                self.improvements += 1;
            }
            self.best = Some(evaluation.clone());
        }
        self.last = Some(evaluation);
    }
}

/// An [`Objective`] seen through `argmin`'s `CostFunction` and `Gradient`
pub(crate) struct ArgminObjective<'a> {
    objective: &'a dyn Objective,
    tracker: &'a RefCell<RunTracker>,
}

impl<'a> ArgminObjective<'a> {
    pub(crate) fn new(objective: &'a dyn Objective, tracker: &'a RefCell<RunTracker>) -> Self {
        Self { objective, tracker }
    }

    /// Evaluate the starting point and return early if it already satisfies
    /// the tolerance, or if the loss there is not finite
    pub(crate) fn start(
        &self,
        initial: &Array1<f64>,
        gradient_tolerance: f64,
    ) -> Result<Option<MinimizeResult>> {
        let (loss, gradient) = self.objective.evaluate(initial)?;
        let gradient_norm = inf_norm(&gradient);
        let termination = if !loss.is_finite() {
            warn!("Objective is not finite at the initial point");
            Termination::Diverged
        } else if gradient_norm <= gradient_tolerance {
            Termination::Converged
        } else {
            self.tracker.borrow_mut().record(Evaluation {
                params: initial.clone(),
                loss,
                gradient,
            });
            return Ok(None);
        };
        Ok(Some(MinimizeResult {
            params: initial.clone(),
            loss,
            gradient_norm,
            iterations: 0,
            evaluations: 1,
            termination,
        }))
    }

    fn evaluate(&self, params: &Array1<f64>) -> std::result::Result<Evaluation, ArgminError> {
        let mut tracker = self.tracker.borrow_mut();
        if let Some(last) = tracker.last.as_ref().filter(|last| last.params == *params) {
            return Ok(last.clone());
        }
        if params.iter().any(|v| !v.is_finite()) {
            tracker.saw_non_finite = true;
            return Err(ArgminError::msg("solver produced non-finite parameters"));
        }
        match self.objective.evaluate(params) {
            Ok((loss, gradient)) => {
                let evaluation = Evaluation {
                    params: params.clone(),
                    loss,
                    gradient,
                };
                tracker.record(evaluation.clone());
                Ok(evaluation)
            }
            Err(err) => {
                let message = err.to_string();
                tracker.failure = Some(err);
                Err(ArgminError::msg(message))
            }
        }
    }
}

impl CostFunction for ArgminObjective<'_> {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        self.evaluate(params).map(|evaluation| evaluation.loss)
    }
}

impl Gradient for ArgminObjective<'_> {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    fn gradient(&self, params: &Self::Param) -> std::result::Result<Self::Gradient, ArgminError> {
        self.evaluate(params).map(|evaluation| evaluation.gradient)
    }
}

/// What the executor reported back
pub(crate) enum SolverOutcome {
    /// The run ended normally after this many iterations
    Finished { iterations: u64 },
    /// The solver returned an error part way through
    Aborted(ArgminError),
}

/// Turn a finished or aborted run into a [`MinimizeResult`]
///
/// The lowest-loss point seen is returned in every case. Errors raised by
/// the objective itself are passed on to the caller.
pub(crate) fn finish_run(
    tracker: RunTracker,
    outcome: SolverOutcome,
    max_iterations: usize,
    gradient_tolerance: f64,
) -> Result<MinimizeResult> {
    if let Some(failure) = tracker.failure {
        return Err(failure);
    }
    let best = tracker.best.ok_or_else(|| {
        LogRegError::OptimizerError("no finite objective value was observed".to_string())
    })?;
    let gradient_norm = inf_norm(&best.gradient);
    let converged = gradient_norm <= gradient_tolerance;

    let (iterations, termination) = match outcome {
        SolverOutcome::Finished { iterations } => {
            let iterations = usize::try_from(iterations).unwrap_or(usize::MAX);
            let termination = if converged {
                Termination::Converged
            } else if iterations >= max_iterations {
                Termination::MaxIterations
            } else {
                Termination::Stalled
            };
            (iterations, termination)
        }
        SolverOutcome::Aborted(err) => {
            let termination = if converged {
                Termination::Converged
            } else if tracker.saw_non_finite {
                Termination::Diverged
            } else {
                Termination::LineSearchFailed
            };
            if converged {
                debug!("Solver stopped after reaching the tolerance: {err}");
            } else {
                warn!("Solver stopped early: {err}");
            }
            (tracker.improvements.min(max_iterations), termination)
        }
    };

    Ok(MinimizeResult {
        params: best.params,
        loss: best.loss,
        gradient_norm,
        iterations,
        evaluations: tracker.evaluations,
        termination,
    })
}
