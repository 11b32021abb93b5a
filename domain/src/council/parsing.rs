//! Grader response parsing.
//!
//! Extracts the structured grade from a model's reply. Pure domain logic:
//! no I/O, just JSON extraction and field validation.
//!
//! # Accepted shapes
//!
//! 1. Bare JSON object (preferred)
//! 2. JSON inside a Markdown code fence
//! 3. JSON surrounded by prose (outermost `{` ... `}` is used)

use crate::grading::CategoryScore;
use serde_json::{Map, Value};
use thiserror::Error;

/// Confidence assumed when a grader omits it
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Why a grader response could not be used
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("response contains no JSON object")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Structured content of one grader response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGrade {
    pub scores: Vec<CategoryScore>,
    pub overall_feedback: String,
    pub confidence: f64,
}

/// Parse a grader response.
///
/// `scores` (with `category`, `score`, `max_score`, `evidence`, `feedback`
/// per entry) and `overall_feedback` are required. `confidence` defaults to
/// [`DEFAULT_CONFIDENCE`] and is clamped into `[0, 1]`. Scores are clamped
/// into `[0, max_score]`; `max_score` must be positive.
///
/// # Examples
///
/// ```
/// use council_domain::council::parse_grade_response;
///
/// let reply = r#"{"scores": [{"category": "Clarity", "score": 4, "max_score": 5,
///     "evidence": "\"I think...\"", "feedback": "Clear."}],
///     "overall_feedback": "Solid answer.", "confidence": 0.9}"#;
/// let grade = parse_grade_response(reply).unwrap();
/// assert_eq!(grade.scores[0].score, 4.0);
/// ```
pub fn parse_grade_response(response: &str) -> Result<ParsedGrade, ParseError> {
    let json = extract_json_object(response).ok_or(ParseError::NoJson)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ParseError::InvalidJson("top-level value is not an object".to_string()))?;

    let raw_scores = field(object, &["scores"])?
        .as_array()
        .ok_or_else(|| invalid("scores", "expected an array"))?;

    let scores = raw_scores
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_category_score(i, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let overall_feedback = string_field(object, &["overall_feedback", "overallFeedback"], "overall_feedback")?;

    let confidence = match object.get("confidence") {
        None | Some(Value::Null) => DEFAULT_CONFIDENCE,
        Some(v) => v
            .as_f64()
            .filter(|c| c.is_finite())
            .ok_or_else(|| invalid("confidence", "expected a number"))?
            .clamp(0.0, 1.0),
    };

    Ok(ParsedGrade {
        scores,
        overall_feedback,
        confidence,
    })
}

fn parse_category_score(index: usize, entry: &Value) -> Result<CategoryScore, ParseError> {
    let object = entry
        .as_object()
        .ok_or_else(|| invalid(&format!("scores[{index}]"), "expected an object"))?;
    let name = |f: &str| format!("scores[{index}].{f}");

    let category = string_field(object, &["category"], &name("category"))?;
    let score = number_field(object, &["score"], &name("score"))?;
    let max_score = number_field(object, &["max_score", "maxScore"], &name("max_score"))?;
    if max_score <= 0.0 {
        return Err(invalid(&name("max_score"), "must be greater than zero"));
    }
    let evidence = string_field(object, &["evidence"], &name("evidence"))?;
    let feedback = string_field(object, &["feedback"], &name("feedback"))?;

    Ok(CategoryScore::new(category, score, max_score)
        .with_evidence(evidence)
        .with_feedback(feedback))
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Result<&'a Value, ParseError> {
    keys.iter()
        .find_map(|k| object.get(*k).filter(|v| !v.is_null()))
        .ok_or_else(|| ParseError::MissingField(keys[0].to_string()))
}

fn string_field(
    object: &Map<String, Value>,
    keys: &[&str],
    name: &str,
) -> Result<String, ParseError> {
    match field(object, keys) {
        Ok(Value::String(s)) => Ok(s.clone()),
        Ok(_) => Err(invalid(name, "expected a string")),
        Err(_) => Err(ParseError::MissingField(name.to_string())),
    }
}

fn number_field(object: &Map<String, Value>, keys: &[&str], name: &str) -> Result<f64, ParseError> {
    match field(object, keys) {
        Ok(v) => v
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| invalid(name, "expected a number")),
        Err(_) => Err(ParseError::MissingField(name.to_string())),
    }
}

fn invalid(field: &str, reason: &str) -> ParseError {
    ParseError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Locate the JSON object in a model reply
fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}
