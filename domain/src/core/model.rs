//! Model value object representing a grading LLM

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Provider family that serves a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }

    /// Human-readable provider name used in configuration errors
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Google => "Google",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "google" | "gemini" => Ok(Provider::Google),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Grading models (Value Object)
///
/// Identifiers are opaque to the council: well-known ones get a variant, all
/// others are carried verbatim in [`Model::Custom`]. Parsing never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Model {
    // GPT models
    #[default]
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    // Claude models
    Claude35Sonnet,
    Claude37Sonnet,
    ClaudeSonnet4,
    // Gemini models
    Gemini15Pro,
    Gemini15Flash,
    Gemini25Pro,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::Claude35Sonnet => "claude-3-5-sonnet-20241022",
            Model::Claude37Sonnet => "claude-3-7-sonnet-20250219",
            Model::ClaudeSonnet4 => "claude-sonnet-4-20250514",
            Model::Gemini15Pro => "gemini/gemini-1.5-pro",
            Model::Gemini15Flash => "gemini/gemini-1.5-flash",
            Model::Gemini25Pro => "gemini/gemini-2.5-pro",
            Model::Custom(s) => s,
        }
    }

    /// Default grading council
    pub fn default_models() -> Vec<Model> {
        vec![Model::Gpt4o, Model::Claude35Sonnet, Model::Gemini15Pro]
    }

    /// Provider family inferred from the identifier.
    ///
    /// `gpt`/`o1`/`o3`/`o4` prefixes are OpenAI, anything mentioning `claude`
    /// is Anthropic and anything mentioning `gemini` is Google.
    pub fn provider(&self) -> Option<Provider> {
        let id = self.as_str().to_ascii_lowercase();
        if id.starts_with("gpt") || ["o1", "o3", "o4"].iter().any(|p| id.starts_with(p)) {
            Some(Provider::OpenAi)
        } else if id.contains("claude") {
            Some(Provider::Anthropic)
        } else if id.contains("gemini") {
            Some(Provider::Google)
        } else {
            None
        }
    }

    /// Identifier as the provider API expects it.
    ///
    /// Gemini ids may carry a `gemini/` routing prefix which the Google API
    /// does not understand.
    pub fn api_id(&self) -> &str {
        self.as_str()
            .strip_prefix("gemini/")
            .unwrap_or_else(|| self.as_str())
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "claude-3-5-sonnet-20241022" => Model::Claude35Sonnet,
            "claude-3-7-sonnet-20250219" => Model::Claude37Sonnet,
            "claude-sonnet-4-20250514" => Model::ClaudeSonnet4,
            "gemini/gemini-1.5-pro" | "gemini-1.5-pro" => Model::Gemini15Pro,
            "gemini/gemini-1.5-flash" | "gemini-1.5-flash" => Model::Gemini15Flash,
            "gemini/gemini-2.5-pro" | "gemini-2.5-pro" => Model::Gemini25Pro,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        for model in Model::default_models() {
            let s = model.to_string();
            let parsed: Model = s.parse().unwrap();
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_custom_model() {
        let model: Model = "mistral-large".parse().unwrap();
        assert_eq!(model, Model::Custom("mistral-large".to_string()));
        assert_eq!(model.to_string(), "mistral-large");
        assert_eq!(model.provider(), None);
    }

    #[test]
    fn test_provider_inference() {
        assert_eq!(Model::Gpt4o.provider(), Some(Provider::OpenAi));
        assert_eq!(Model::from("o3-mini").provider(), Some(Provider::OpenAi));
        assert_eq!(Model::Claude35Sonnet.provider(), Some(Provider::Anthropic));
        assert_eq!(Model::Gemini15Pro.provider(), Some(Provider::Google));
        assert_eq!(
            Model::from("gemini-2.0-flash-exp").provider(),
            Some(Provider::Google)
        );
        assert_eq!(Model::Gpt41.provider(), Some(Provider::OpenAi));
    }

    #[test]
    fn test_bare_gemini_id_parses_to_known_variant() {
        assert_eq!(Model::from("gemini-1.5-pro"), Model::Gemini15Pro);
    }

    #[test]
    fn test_api_id_strips_gemini_prefix() {
        assert_eq!(Model::Gemini15Pro.api_id(), "gemini-1.5-pro");
        assert_eq!(Model::Gpt4o.api_id(), "gpt-4o");
        assert_eq!(Model::from("gemini-exp").api_id(), "gemini-exp");
    }

    #[test]
    fn test_model_serde_as_string() {
        let json = serde_json::to_string(&Model::Claude35Sonnet).unwrap();
        assert_eq!(json, "\"claude-3-5-sonnet-20241022\"");
        let back: Model = serde_json::from_str("\"my-grader\"").unwrap();
        assert_eq!(back, Model::Custom("my-grader".to_string()));
    }

    #[test]
    fn test_default_model() {
        assert_eq!(Model::default(), Model::Gpt4o);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>(), Ok(Provider::OpenAi));
        assert_eq!("gemini".parse::<Provider>(), Ok(Provider::Google));
        assert!("azure".parse::<Provider>().is_err());
    }
}
