//! Aggregator: combines category scores from one or more graders into a
//! single weighted final grade.

use crate::core::string::truncate_chars;
use crate::grading::{CategoryScore, FinalGrade, GraderResult, RubricCategory, find_category};

/// Maximum length of the combined overall feedback, in characters
pub const MAX_OVERALL_FEEDBACK_CHARS: usize = 500;

/// Weight applied to categories that graders report but the rubric lacks
pub const UNMATCHED_CATEGORY_WEIGHT: f64 = 1.0;

/// Output of [`aggregate`]
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub grade: FinalGrade,
    /// Category names reported by graders that are not in the rubric.
    /// They were weighted with [`UNMATCHED_CATEGORY_WEIGHT`].
    pub unmatched_categories: Vec<String>,
}

struct CategoryBucket<'a> {
    name: &'a str,
    max_score: f64,
    scores: Vec<f64>,
    first: &'a CategoryScore,
}

/// Combine grader results into a [`FinalGrade`].
///
/// Per category the final score is the mean of the scores of every grader
/// that reported it, weighted by the rubric weight of the same name.
/// Rubric categories take `max_score` from the rubric's `max_points` and
/// every contributed score is clamped to it, so graders echoing a different
/// scale cannot push the total past the maximum. Unmatched categories use
/// the first contributor's `max_score`. Evidence and feedback come from the
/// first contributing grader (minority evidence is not merged).
///
/// Categories are listed in rubric order, followed by unmatched categories in
/// first-seen order. Overall feedback is deduplicated keeping the first
/// occurrence in result order, joined with spaces and truncated to
/// [`MAX_OVERALL_FEEDBACK_CHARS`].
pub fn aggregate(results: &[GraderResult], rubric: &[RubricCategory]) -> Aggregation {
    let mut buckets: Vec<CategoryBucket<'_>> = Vec::new();
    for result in results {
        for score in &result.scores {
            match buckets.iter_mut().find(|b| b.name == score.category) {
                Some(bucket) => bucket.scores.push(score.score),
                None => buckets.push(CategoryBucket {
                    name: &score.category,
                    max_score: score.max_score,
                    scores: vec![score.score],
                    first: score,
                }),
            }
        }
    }

    let rank = |name: &str| {
        rubric
            .iter()
            .position(|c| c.name == name)
            .unwrap_or(rubric.len())
    };
    // Stable sort keeps first-seen order among unmatched categories
    buckets.sort_by_key(|b| rank(b.name));

    let mut scores = Vec::with_capacity(buckets.len());
    let mut unmatched_categories = Vec::new();
    let mut total_score = 0.0;
    let mut max_possible_score = 0.0;

    for bucket in &buckets {
        let (max_score, weight) = match find_category(rubric, bucket.name) {
            Some(category) => (category.max_points, category.weight),
            None => {
                unmatched_categories.push(bucket.name.to_string());
                (bucket.max_score, UNMATCHED_CATEGORY_WEIGHT)
            }
        };
        let ceiling = max_score.max(0.0);
        let mean = bucket
            .scores
            .iter()
            .map(|s| s.clamp(0.0, ceiling))
            .sum::<f64>()
            / bucket.scores.len() as f64;

        total_score += mean * weight;
        max_possible_score += max_score * weight;

        scores.push(CategoryScore {
            category: bucket.name.to_string(),
            score: mean,
            max_score,
            evidence: bucket.first.evidence.clone(),
            feedback: bucket.first.feedback.clone(),
        });
    }

    let percentage = if max_possible_score > 0.0 {
        100.0 * total_score / max_possible_score
    } else {
        0.0
    };

    Aggregation {
        grade: FinalGrade {
            scores,
            total_score,
            max_possible_score,
            percentage,
            overall_feedback: combine_feedback(results),
        },
        unmatched_categories,
    }
}

/// Deduplicate overall feedback, first occurrence wins
fn combine_feedback(results: &[GraderResult]) -> String {
    let mut unique: Vec<&str> = Vec::new();
    for result in results {
        let feedback = result.overall_feedback.trim();
        if !feedback.is_empty() && !unique.contains(&feedback) {
            unique.push(feedback);
        }
    }
    truncate_chars(&unique.join(" "), MAX_OVERALL_FEEDBACK_CHARS)
}
