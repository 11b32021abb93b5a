//! Grading entities: rubric categories, per-category scores and grader results.

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One weighted, bounded scoring dimension of a rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricCategory {
    /// Lookup key for scores reported by graders
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "max_points")]
    pub max_points: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl RubricCategory {
    pub fn new(name: impl Into<String>, max_points: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            max_points,
            weight,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Check that a rubric can be graded against.
///
/// Requires at least one category, non-blank names, `max_points > 0` and
/// `weight >= 0` (both finite). Duplicate names are allowed; lookups resolve
/// to the first category with that name.
pub fn validate_rubric(rubric: &[RubricCategory]) -> Result<(), DomainError> {
    if rubric.is_empty() {
        return Err(DomainError::InvalidRubric(
            "rubric has no categories".to_string(),
        ));
    }
    for category in rubric {
        if category.name.trim().is_empty() {
            return Err(DomainError::InvalidRubric(
                "category name must not be empty".to_string(),
            ));
        }
        if !category.max_points.is_finite() || category.max_points <= 0.0 {
            return Err(DomainError::InvalidRubric(format!(
                "category '{}' must have max points > 0, got {}",
                category.name, category.max_points
            )));
        }
        if !category.weight.is_finite() || category.weight < 0.0 {
            return Err(DomainError::InvalidRubric(format!(
                "category '{}' must have a non-negative weight, got {}",
                category.name, category.weight
            )));
        }
    }
    Ok(())
}

/// Find a rubric category by name
pub fn find_category<'a>(rubric: &'a [RubricCategory], name: &str) -> Option<&'a RubricCategory> {
    rubric.iter().find(|c| c.name == name)
}

/// Score given by one grader for one category.
///
/// Invariant: `0 <= score <= max_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
    pub max_score: f64,
    pub evidence: String,
    pub feedback: String,
}

impl CategoryScore {
    /// Create a score, clamping it into `[0, max_score]`
    pub fn new(category: impl Into<String>, score: f64, max_score: f64) -> Self {
        Self {
            category: category.into(),
            score: score.clamp(0.0, max_score.max(0.0)),
            max_score,
            evidence: String::new(),
            feedback: String::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = feedback.into();
        self
    }

    /// Score mapped onto `[0, 1]`
    pub fn normalized(&self) -> f64 {
        if self.max_score > 0.0 {
            self.score / self.max_score
        } else {
            0.0
        }
    }
}

/// Round of the council protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GradingRound {
    /// Round 1: every grader scores independently
    Independent,
    /// Round 2: graders re-score after seeing round-1 results
    Deliberation,
}

impl GradingRound {
    pub fn number(&self) -> u8 {
        match self {
            GradingRound::Independent => 1,
            GradingRound::Deliberation => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GradingRound::Independent => "Round 1: Independent Grading",
            GradingRound::Deliberation => "Round 2: Deliberation",
        }
    }
}

impl std::fmt::Display for GradingRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "round {}", self.number())
    }
}

impl TryFrom<u8> for GradingRound {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GradingRound::Independent),
            2 => Ok(GradingRound::Deliberation),
            other => Err(format!("invalid grading round: {other}")),
        }
    }
}

impl Serialize for GradingRound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for GradingRound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = u8::deserialize(deserializer)?;
        GradingRound::try_from(n).map_err(serde::de::Error::custom)
    }
}

/// Successful grade from one model in one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraderResult {
    pub model: Model,
    pub round: GradingRound,
    pub scores: Vec<CategoryScore>,
    pub overall_feedback: String,
    /// Self-reported confidence in `[0, 1]`
    pub confidence: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: u64,
}

impl GraderResult {
    pub fn new(model: Model, round: GradingRound, scores: Vec<CategoryScore>) -> Self {
        Self {
            model,
            round,
            scores,
            overall_feedback: String::new(),
            confidence: 0.8,
            prompt_tokens: 0,
            completion_tokens: 0,
            latency_ms: 0,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.overall_feedback = feedback.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_usage(mut self, prompt_tokens: u32, completion_tokens: u32, latency_ms: u64) -> Self {
        self.prompt_tokens = prompt_tokens;
        self.completion_tokens = completion_tokens;
        self.latency_ms = latency_ms;
        self
    }
}
