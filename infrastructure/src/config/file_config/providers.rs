//! Provider configuration from TOML (`[providers]` section)
//!
//! ```toml
//! [providers]
//! key_source = "platform"
//! max_concurrent_calls = 10
//!
//! [providers.openai]
//! api_key_env = "OPENAI_API_KEY"
//!
//! [providers.routing]
//! "my-finetune" = "openai"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (can point at a compatible gateway).
    pub base_url: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// Google Gemini API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGoogleConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Base URL for the Generative Language API.
    pub base_url: String,
}

impl Default for FileGoogleConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Whose keys the run uses: "platform" or "user".
    pub key_source: String,
    /// Upper bound on grading calls in flight at once.
    pub max_concurrent_calls: usize,
    pub openai: FileOpenAiConfig,
    pub anthropic: FileAnthropicConfig,
    pub google: FileGoogleConfig,
    /// Explicit model → provider routing overrides ("openai", "anthropic", "google").
    pub routing: HashMap<String, String>,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            key_source: "platform".to_string(),
            max_concurrent_calls: 10,
            openai: FileOpenAiConfig::default(),
            anthropic: FileAnthropicConfig::default(),
            google: FileGoogleConfig::default(),
            routing: HashMap::new(),
        }
    }
}
