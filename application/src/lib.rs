//! Application layer for grading-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExecutionParams, RetryPolicy};
pub use ports::{
    llm_gateway::{Completion, CompletionRequest, GatewayError, LlmGateway},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::invoke_model::{GradeError, Invocation, ModelInvoker};
pub use use_cases::run_council::{
    DEFAULT_AGREEMENT_THRESHOLD, RunCouncilError, RunCouncilInput, RunCouncilUseCase,
};
