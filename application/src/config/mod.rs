//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ExecutionParams`]: sampling, per-call timeout and retry for grading calls
//! - [`RetryPolicy`]: bounded exponential backoff

pub mod execution_params;
pub mod retry_policy;

pub use execution_params::ExecutionParams;
pub use retry_policy::RetryPolicy;
