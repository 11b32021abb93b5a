//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod council;
mod output;
mod providers;

pub use council::FileCouncilConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{
    FileAnthropicConfig, FileGoogleConfig, FileOpenAiConfig, FileProvidersConfig,
};

use council_domain::KeySource;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council membership, threshold and invocation settings
    pub council: FileCouncilConfig,
    /// Provider endpoints, keys and routing
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

/// How serious a configuration issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Run can proceed with a fallback value
    Warning,
    /// Run must not start
    Error,
}

/// One problem found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending field, e.g. `council.agreement_threshold`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let council = &self.council;

        if council.models.iter().any(|m| m.trim().is_empty()) {
            issues.push(ConfigIssue::warning(
                "council.models",
                "empty model names are ignored",
            ));
        }
        if council.parse_models().is_empty() {
            issues.push(ConfigIssue::error(
                "council.models",
                "at least one grading model is required",
            ));
        }
        if !(0.0..=1.0).contains(&council.agreement_threshold) {
            issues.push(ConfigIssue::error(
                "council.agreement_threshold",
                format!("must be within [0, 1], got {}", council.agreement_threshold),
            ));
        }
        if !(0.0..=2.0).contains(&council.temperature) {
            issues.push(ConfigIssue::warning(
                "council.temperature",
                format!("{} is outside the usual range [0, 2]", council.temperature),
            ));
        }
        if council.max_tokens == 0 {
            issues.push(ConfigIssue::error("council.max_tokens", "must be positive"));
        }
        if council.max_attempts == 0 {
            issues.push(ConfigIssue::warning(
                "council.max_attempts",
                "0 attempts is treated as 1",
            ));
        }
        if council.max_backoff_ms < council.initial_backoff_ms {
            issues.push(ConfigIssue::warning(
                "council.max_backoff_ms",
                "lower than initial_backoff_ms, raised to match",
            ));
        }

        if self.providers.max_concurrent_calls == 0 {
            issues.push(ConfigIssue::error(
                "providers.max_concurrent_calls",
                "must be positive",
            ));
        }
        if let Err(e) = self.providers.key_source.parse::<KeySource>() {
            issues.push(ConfigIssue::error("providers.key_source", e));
        }
        for (model, provider) in &self.providers.routing {
            if !matches!(provider.as_str(), "openai" | "anthropic" | "google") {
                issues.push(ConfigIssue::warning(
                    "providers.routing",
                    format!("unknown provider '{provider}' for model '{model}', entry ignored"),
                ));
            }
        }

        issues
    }

    /// Whether any issue blocks a run
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(ConfigIssue::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::Model;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[council]
models = ["gpt-4o", "gemini/gemini-1.5-pro"]
agreement_threshold = 0.75

[providers]
max_concurrent_calls = 4

[providers.anthropic]
api_key_env = "MY_ANTHROPIC_KEY"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.council.parse_models(),
            vec![Model::Gpt4o, Model::Gemini15Pro]
        );
        assert_eq!(config.council.agreement_threshold, 0.75);
        assert_eq!(config.providers.max_concurrent_calls, 4);
        assert_eq!(config.providers.anthropic.api_key_env, "MY_ANTHROPIC_KEY");
        assert_eq!(config.output.format, Some(FileOutputFormat::Full));
        assert!(!config.output.color);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.council.parse_models(), Model::default_models());
        assert!(config.output.color);
        assert_eq!(config.providers.key_source, "platform");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_errors() {
        let mut config = FileConfig::default();
        config.council.models = vec!["".to_string()];
        config.council.agreement_threshold = 1.5;
        config.providers.key_source = "nobody".to_string();

        let issues = config.validate();
        assert!(FileConfig::has_errors(&issues));
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"council.models"));
        assert!(fields.contains(&"council.agreement_threshold"));
        assert!(fields.contains(&"providers.key_source"));
    }

    #[test]
    fn test_validate_warnings_do_not_block() {
        let mut config = FileConfig::default();
        config.council.max_attempts = 0;
        config
            .providers
            .routing
            .insert("x".to_string(), "azure".to_string());

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(!FileConfig::has_errors(&issues));
    }
}
