//! Agreement calculator
//!
//! Measures how closely graders' normalized category scores cluster.
//! Lower variance means higher agreement.

use crate::grading::GraderResult;
use std::collections::BTreeMap;

/// Scale applied to the mean per-category variance.
///
/// A variance of 0.25 (scores split between both ends of `[0, 1]`) already
/// maps to zero agreement.
pub const VARIANCE_SCALE: f64 = 4.0;

/// Consensus score in `[0, 1]` across a set of grader results.
///
/// - Fewer than two results: `1.0`.
/// - Each score is normalized to `score / max_score`; categories scored by at
///   least two graders contribute their population variance.
/// - No such category: `1.0`.
/// - Otherwise `max(0, 1 - min(4 * mean_variance, 1))`.
///
/// # Example
///
/// ```
/// use council_domain::council::agreement;
/// use council_domain::{CategoryScore, GraderResult, GradingRound, Model};
///
/// let a = GraderResult::new(Model::Gpt4o, GradingRound::Independent,
///     vec![CategoryScore::new("Clarity", 4.0, 5.0)]);
/// let b = GraderResult::new(Model::Claude35Sonnet, GradingRound::Independent,
///     vec![CategoryScore::new("Clarity", 4.0, 5.0)]);
///
/// assert_eq!(agreement(&[a, b]), 1.0);
/// ```
pub fn agreement(results: &[GraderResult]) -> f64 {
    if results.len() < 2 {
        return 1.0;
    }

    let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for result in results {
        for score in &result.scores {
            by_category
                .entry(score.category.as_str())
                .or_default()
                .push(score.normalized());
        }
    }

    let variances: Vec<f64> = by_category
        .values()
        .filter(|values| values.len() >= 2)
        .map(|values| population_variance(values))
        .collect();

    if variances.is_empty() {
        return 1.0;
    }

    let mean_variance = variances.iter().sum::<f64>() / variances.len() as f64;
    (1.0 - (mean_variance * VARIANCE_SCALE).min(1.0)).max(0.0)
}

fn population_variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}
