//! Error types for logistic regression training and prediction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogRegError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid label: expected a class in 0..{n_class}, got {label}")]
    InvalidLabel { label: usize, n_class: usize },

    #[error("Non-finite input: {0}")]
    NonFiniteInput(String),

    #[error("Optimizer error: {0}")]
    OptimizerError(String),

    #[error("Model layout mismatch: {0}")]
    ModelMismatch(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LogRegError {
    /// Shorthand used by the shape checks in front of every matrix product
    pub(crate) fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, LogRegError>;
