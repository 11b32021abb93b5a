//! Grading domain
//!
//! Rubrics, per-category scores, per-grader results and the final aggregated
//! grade of a council run.

pub mod entities;
pub mod value_objects;

pub use entities::{
    CategoryScore, GraderResult, GradingRound, RubricCategory, find_category, validate_rubric,
};
pub use value_objects::{CouncilResult, FinalGrade, GraderFailure};
