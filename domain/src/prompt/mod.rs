//! Prompt domain
//!
//! Templates for the independent and deliberation grading rounds.

mod template;

pub use template::PromptTemplate;
