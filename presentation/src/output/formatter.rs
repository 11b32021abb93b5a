//! Output formatter trait

use council_domain::{CouncilResult, OutputFormat};

/// Trait for formatting council results
pub trait OutputFormatter {
    /// Format the complete result, both rounds included
    fn format(&self, result: &CouncilResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &CouncilResult) -> String;

    /// Format the final grade only (concise output)
    fn format_summary(&self, result: &CouncilResult) -> String;

    /// Dispatch on the requested format
    fn render(&self, result: &CouncilResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(result),
            OutputFormat::Summary => self.format_summary(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
