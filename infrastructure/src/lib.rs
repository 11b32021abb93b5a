//! Infrastructure layer for grading-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod providers;
pub mod rubric;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, CredentialResolver, FileConfig, FileCouncilConfig,
    FileOutputConfig, FileOutputFormat, FileProvidersConfig, Severity,
};
pub use providers::{
    ProviderAdapter, anthropic::AnthropicAdapter, gemini::GeminiAdapter, openai::OpenAiAdapter,
    routing::RoutingGateway,
};
pub use rubric::{RubricError, RubricLoader};
