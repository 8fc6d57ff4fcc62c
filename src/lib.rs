//! Multi-class logistic regression for digit classification
//!
//! Two classifier families share one linear model shape, a (D + 1) x K
//! weight matrix whose first row is the bias:
//! - one-vs-all: K independent sigmoid classifiers
//! - multinomial: a single softmax classifier over all K classes
//!
//! Both are trained by minimizing a cross-entropy objective with a
//! gradient-based [`Minimizer`].

pub mod api;
pub mod core;
pub mod data;
pub mod math;
pub mod model;
pub mod objective;
pub mod optimizer;
pub mod persistence;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{accuracy, EvaluationMetrics, LogisticRegression, TrainedModel};
pub use crate::core::error::*;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{CsvDigits, LabeledMatrix};
pub use crate::model::{
    train_multinomial, train_one_vs_all, LinearModel, MultinomialModel, OneVsAllModel,
    TrainingReport,
};
pub use crate::objective::{multinomial_objective, one_vs_all_objective};
pub use crate::optimizer::{ConjugateGradient, Lbfgs, SteepestDescent};
pub use crate::persistence::WeightArtifact;
pub use crate::utils::FeaturePipeline;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
