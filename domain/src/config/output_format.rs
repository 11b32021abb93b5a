//! Output format value object

use serde::{Deserialize, Serialize};

/// How a council result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Final grade plus every grader's scores for each round
    Full,
    /// Final grade and agreement only (default)
    #[default]
    Summary,
    /// The serialized council result
    Json,
}
