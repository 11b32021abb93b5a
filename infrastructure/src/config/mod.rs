//! Configuration file loading for grading-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COUNCIL_` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/grading-council/config.toml`
//! 5. Default values

mod credentials;
mod file_config;
mod loader;

pub use credentials::CredentialResolver;
pub use file_config::{
    ConfigIssue, FileAnthropicConfig, FileConfig, FileCouncilConfig, FileGoogleConfig,
    FileOpenAiConfig, FileOutputConfig, FileOutputFormat, FileProvidersConfig, Severity,
};
pub use loader::{ConfigError, ConfigLoader};
