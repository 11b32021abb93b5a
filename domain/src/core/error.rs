//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No grading models configured for the council")]
    NoModels,

    #[error("Invalid rubric: {0}")]
    InvalidRubric(String),

    #[error("Agreement threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}
