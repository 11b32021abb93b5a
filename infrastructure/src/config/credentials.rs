//! Credential resolution from configuration and environment

use super::file_config::FileProvidersConfig;
use super::loader::ConfigError;
use council_domain::{Credential, KeySource, Provider};
use tracing::debug;

/// Builds the per-run [`Credential`] from the `[providers]` section.
///
/// A direct `api_key` wins over the variable named by `api_key_env`.
pub struct CredentialResolver<'a> {
    config: &'a FileProvidersConfig,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(config: &'a FileProvidersConfig) -> Self {
        Self { config }
    }

    /// Resolve keys from the process environment
    pub fn resolve(&self) -> Result<Credential, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve keys using `lookup` for environment variables
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Credential, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source: KeySource =
            self.config
                .key_source
                .parse()
                .map_err(|message| ConfigError::Invalid {
                    field: "providers.key_source".to_string(),
                    message,
                })?;

        let entries = [
            (
                Provider::OpenAi,
                &self.config.openai.api_key,
                &self.config.openai.api_key_env,
            ),
            (
                Provider::Anthropic,
                &self.config.anthropic.api_key,
                &self.config.anthropic.api_key_env,
            ),
            (
                Provider::Google,
                &self.config.google.api_key,
                &self.config.google.api_key_env,
            ),
        ];

        let mut credential = Credential::new(source);
        for (provider, direct, env_name) in entries {
            let key = direct.clone().or_else(|| lookup(env_name.as_str()));
            if let Some(key) = key {
                credential = credential.with_key(provider, key);
            }
        }

        debug!(
            source = %source,
            providers = ?credential.providers(),
            "Resolved credential"
        );
        Ok(credential)
    }
}
