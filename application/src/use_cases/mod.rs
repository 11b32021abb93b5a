//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod invoke_model;
pub mod run_council;
