//! Resolved provider credentials for one grading run
//!
//! A [`Credential`] is produced once per run by whatever resolves key/quota
//! policy and is forwarded unchanged to every model call in both rounds.

use super::model::Provider;

/// Where the keys in a [`Credential`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySource {
    /// Keys supplied by the requesting user
    UserKeys,
    /// Keys owned by the platform operator
    #[default]
    PlatformShared,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::UserKeys => "user_keys",
            KeySource::PlatformShared => "platform_shared",
        }
    }
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for KeySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user_keys" | "user" => Ok(KeySource::UserKeys),
            "platform_shared" | "platform" | "shared" => Ok(KeySource::PlatformShared),
            other => Err(format!("unknown key source: {other}")),
        }
    }
}

/// API keys per provider.
///
/// `Debug` never prints key material.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    source: KeySource,
    openai: Option<String>,
    anthropic: Option<String>,
    google: Option<String>,
}

impl Credential {
    pub fn new(source: KeySource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Set the key for a provider. Blank keys are treated as absent.
    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let key = key.into();
        let key = if key.trim().is_empty() { None } else { Some(key) };
        match provider {
            Provider::OpenAi => self.openai = key,
            Provider::Anthropic => self.anthropic = key,
            Provider::Google => self.google = key,
        }
        self
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    /// Key for the given provider, if the credential carries one
    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
            Provider::Google => self.google.as_deref(),
        }
    }

    pub fn has_key_for(&self, provider: Provider) -> bool {
        self.key_for(provider).is_some()
    }

    /// Providers this credential can authenticate against
    pub fn providers(&self) -> Vec<Provider> {
        [Provider::OpenAi, Provider::Anthropic, Provider::Google]
            .into_iter()
            .filter(|p| self.has_key_for(*p))
            .collect()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| if k.is_some() { "<redacted>" } else { "<none>" };
        f.debug_struct("Credential")
            .field("source", &self.source)
            .field("openai", &redact(&self.openai))
            .field("anthropic", &redact(&self.anthropic))
            .field("google", &redact(&self.google))
            .finish()
    }
}
