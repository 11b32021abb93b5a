//! Local file system rubric loader

use council_domain::{DomainError, RubricCategory, validate_rubric};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading grading inputs
#[derive(Error, Debug)]
pub enum RubricError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML rubric: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON rubric: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported rubric format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("Transcript {} is empty", .0.display())]
    EmptyTranscript(PathBuf),
}

/// TOML rubric document
#[derive(Debug, Deserialize)]
struct RubricDocument {
    categories: Vec<RubricCategory>,
}

/// JSON rubrics may be a bare array or wrapped like the TOML form
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonRubric {
    Bare(Vec<RubricCategory>),
    Wrapped(RubricDocument),
}

/// Reads grading inputs from the local file system
#[derive(Debug, Clone, Default)]
pub struct RubricLoader;

impl RubricLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate a rubric. The format follows the file extension.
    pub fn load(&self, path: &Path) -> Result<Vec<RubricCategory>, RubricError> {
        let content = read(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let rubric = match extension.as_str() {
            "toml" => Self::parse_toml(&content)?,
            "json" => Self::parse_json(&content)?,
            other => return Err(RubricError::UnsupportedFormat(other.to_string())),
        };
        debug!(path = %path.display(), categories = rubric.len(), "Loaded rubric");
        Ok(rubric)
    }

    /// Parse a `[[categories]]` TOML rubric
    pub fn parse_toml(content: &str) -> Result<Vec<RubricCategory>, RubricError> {
        let document: RubricDocument = toml::from_str(content)?;
        validate_rubric(&document.categories)?;
        Ok(document.categories)
    }

    /// Parse a JSON rubric (array of categories, or `{"categories": [...]}`)
    pub fn parse_json(content: &str) -> Result<Vec<RubricCategory>, RubricError> {
        let categories = match serde_json::from_str::<JsonRubric>(content)? {
            JsonRubric::Bare(categories) => categories,
            JsonRubric::Wrapped(document) => document.categories,
        };
        validate_rubric(&categories)?;
        Ok(categories)
    }

    /// Read a transcript verbatim; only an all-whitespace file is rejected
    pub fn load_transcript(&self, path: &Path) -> Result<String, RubricError> {
        let transcript = read(path)?;
        if transcript.trim().is_empty() {
            return Err(RubricError::EmptyTranscript(path.to_path_buf()));
        }
        Ok(transcript)
    }
}

fn read(path: &Path) -> Result<String, RubricError> {
    fs::read_to_string(path).map_err(|source| RubricError::Io {
        path: path.to_path_buf(),
        source,
    })
}
