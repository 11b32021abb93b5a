//! Domain layer for grading-council
//!
//! This crate contains the core grading logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Grading Council
//!
//! Several independent LLM graders score one transcript against a weighted
//! rubric:
//!
//! - **Agreement**: how closely the graders' normalized scores cluster
//! - **Deliberation**: a second round in which graders see round-1 scores
//! - **Aggregation**: weighted mean of the surviving grades

pub mod config;
pub mod core;
pub mod council;
pub mod grading;
pub mod prompt;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    credential::{Credential, KeySource},
    error::DomainError,
    model::{Model, Provider},
};
pub use council::{
    Aggregation, CouncilState, ParseError, ParsedGrade, aggregate, agreement,
    parse_grade_response,
};
pub use grading::{
    CategoryScore, CouncilResult, FinalGrade, GraderFailure, GraderResult, GradingRound,
    RubricCategory, find_category, validate_rubric,
};
pub use prompt::PromptTemplate;
