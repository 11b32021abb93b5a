//! Grading value objects - immutable result types of a council run.
//!
//! - [`FinalGrade`] - Weighted aggregate of the surviving grader results
//! - [`GraderFailure`] - A (model, round) pair that was dropped
//! - [`CouncilResult`] - Complete result of one council run

use super::entities::{CategoryScore, GraderResult, GradingRound};
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Aggregated grade produced from one or more graders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalGrade {
    /// Mean score per category (raw points, not normalized)
    pub scores: Vec<CategoryScore>,
    pub total_score: f64,
    pub max_possible_score: f64,
    /// `100 * total_score / max_possible_score`, or 0 when nothing is possible
    pub percentage: f64,
    pub overall_feedback: String,
}

impl FinalGrade {
    /// Grade with no scored categories
    pub fn empty() -> Self {
        Self {
            scores: Vec::new(),
            total_score: 0.0,
            max_possible_score: 0.0,
            percentage: 0.0,
            overall_feedback: String::new(),
        }
    }
}

/// A grader that produced no usable result in a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraderFailure {
    pub model: Model,
    pub round: GradingRound,
    pub reason: String,
}

impl GraderFailure {
    pub fn new(model: Model, round: GradingRound, reason: impl Into<String>) -> Self {
        Self {
            model,
            round,
            reason: reason.into(),
        }
    }
}

/// Complete result of a grading council run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilResult {
    pub round1_grades: Vec<GraderResult>,
    /// `None` when round 1 agreed; `Some(vec![])` when round 2 was attempted
    /// but every grader failed
    pub round2_grades: Option<Vec<GraderResult>>,
    pub final_grade: FinalGrade,
    pub agreement_score: f64,
    pub rounds_used: u8,
    /// Dropped (model, round) pairs across both rounds
    #[serde(default)]
    pub failures: Vec<GraderFailure>,
}

impl CouncilResult {
    /// Whether the deliberation round was dispatched
    pub fn deliberated(&self) -> bool {
        self.round2_grades.is_some()
    }

    /// Distinct models with at least one successful grade, in first-seen order
    pub fn models_used(&self) -> Vec<Model> {
        let mut models: Vec<Model> = Vec::new();
        let round2 = self.round2_grades.iter().flatten();
        for grade in self.round1_grades.iter().chain(round2) {
            if !models.contains(&grade.model) {
                models.push(grade.model.clone());
            }
        }
        models
    }

    /// Failures in the given round
    pub fn failures_in(&self, round: GradingRound) -> impl Iterator<Item = &GraderFailure> {
        self.failures.iter().filter(move |f| f.round == round)
    }
}
