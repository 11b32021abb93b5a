//! Prompt templates for the grading council

use crate::grading::{GraderResult, GradingRound, RubricCategory};
use serde_json::{Value, json};

const RESPONSE_FORMAT: &str = r#"Respond ONLY with valid JSON in this exact format:
{
    "scores": [
        {
            "category": "Category Name",
            "score": 4,
            "max_score": 5,
            "evidence": "Direct quote from transcript...",
            "feedback": "Brief constructive feedback..."
        }
    ],
    "overall_feedback": "2-3 sentences summarizing overall performance...",
    "confidence": 0.85
}"#;

/// Templates for generating grading prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt shared by both rounds
    pub fn grader_system() -> &'static str {
        "You are an expert educational assessor. Always respond with valid JSON."
    }

    /// User prompt for the given round.
    ///
    /// `previous_round` is only used for [`GradingRound::Deliberation`], where
    /// every grader's round-1 scores are disclosed with the model name.
    pub fn build_prompt(
        transcript: &str,
        rubric: &[RubricCategory],
        round: GradingRound,
        previous_round: &[GraderResult],
    ) -> String {
        match round {
            GradingRound::Independent => Self::independent_prompt(transcript, rubric),
            GradingRound::Deliberation => {
                Self::deliberation_prompt(transcript, rubric, previous_round)
            }
        }
    }

    /// Round 1: independent grading
    pub fn independent_prompt(transcript: &str, rubric: &[RubricCategory]) -> String {
        format!(
            r#"You are an expert grader evaluating a student's oral exam performance.

## Rubric Categories
{}

## Student Transcript
{}

## Instructions
Grade the student's performance on each rubric category. For each category:
1. Assign a score from 0 to the max points
2. Quote specific evidence from the transcript
3. Provide brief feedback

Also summarize the overall performance and report your confidence in your grading as a number between 0 and 1.

{}

Be fair, constructive, and base scores on evidence from the transcript."#,
            Self::rubric_section(rubric),
            transcript,
            RESPONSE_FORMAT
        )
    }

    /// Round 2: deliberation with round-1 scores visible
    pub fn deliberation_prompt(
        transcript: &str,
        rubric: &[RubricCategory],
        previous_round: &[GraderResult],
    ) -> String {
        format!(
            r#"You are an expert grader in a deliberation round. You've seen other graders' assessments.

## Other Graders' Scores
{}

## Rubric Categories
{}

## Student Transcript
{}

## Instructions
Consider the other graders' perspectives. You may adjust your scores if you find their reasoning compelling, but maintain your independent judgment where you believe you are correct.

{}"#,
            Self::peer_scores_section(previous_round),
            Self::rubric_section(rubric),
            transcript,
            RESPONSE_FORMAT
        )
    }

    fn rubric_section(rubric: &[RubricCategory]) -> String {
        rubric
            .iter()
            .map(|c| {
                format!(
                    "- **{}** (max {} points, weight {}): {}",
                    c.name, c.max_points, c.weight, c.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Peer scores in the same snake_case shape graders are asked to reply in
    fn peer_scores_section(previous_round: &[GraderResult]) -> String {
        previous_round
            .iter()
            .map(|g| {
                let scores: Vec<Value> = g
                    .scores
                    .iter()
                    .map(|s| {
                        json!({
                            "category": s.category,
                            "score": s.score,
                            "max_score": s.max_score,
                            "evidence": s.evidence,
                            "feedback": s.feedback,
                        })
                    })
                    .collect();
                let scores = serde_json::to_string_pretty(&scores).unwrap_or_default();
                format!("**{}**: {}", g.model, scores)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
