//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: grading models (GPT, Claude, Gemini, custom)
//! - [`credential::Credential`]: resolved provider keys forwarded to every call
//! - [`error::DomainError`]: domain-level errors

pub mod credential;
pub mod error;
pub mod model;
pub mod string;
