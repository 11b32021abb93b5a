//! Console output formatter for council results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{CategoryScore, CouncilResult, GraderResult, GradingRound};

/// Formats council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete council result
    pub fn format(result: &CouncilResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Grading Council Results"));
        output.push('\n');

        let models: Vec<String> = result.models_used().iter().map(|m| m.to_string()).collect();
        output.push_str(&format!(
            "{} {}\n",
            "Graders:".cyan().bold(),
            models.join(", ")
        ));
        output.push_str(&format!(
            "{} {:.3} ({} round{})\n",
            "Agreement:".cyan().bold(),
            result.agreement_score,
            result.rounds_used,
            if result.rounds_used == 1 { "" } else { "s" }
        ));

        output.push_str(&Self::round_section(
            GradingRound::Independent,
            &result.round1_grades,
        ));

        match &result.round2_grades {
            Some(grades) if grades.is_empty() => {
                output.push_str(&Self::section_header(GradingRound::Deliberation.display_name()));
                output.push_str(&format!(
                    "\n{}\n",
                    "Every grader failed; the final grade uses round 1.".yellow()
                ));
            }
            Some(grades) => {
                output.push_str(&Self::round_section(GradingRound::Deliberation, grades));
            }
            None => {}
        }

        if !result.failures.is_empty() {
            output.push_str(&Self::section_header("Dropped Graders"));
            for failure in &result.failures {
                output.push_str(&format!(
                    "  {} {} (round {}): {}\n",
                    "x".red(),
                    failure.model,
                    failure.round.number(),
                    failure.reason
                ));
            }
        }

        output.push_str(&Self::section_header("Final Grade"));
        output.push_str(&Self::final_grade(result));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &CouncilResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final grade only (concise output)
    pub fn format_summary(result: &CouncilResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Grading Council Verdict ===".cyan().bold()
        ));
        output.push_str(&Self::final_grade(result));
        output.push_str(&format!(
            "\n{} agreement {:.3}, {} round(s), {} grader(s)\n",
            "Council:".dimmed(),
            result.agreement_score,
            result.rounds_used,
            result.models_used().len()
        ));
        if result.deliberated() {
            let round1 = result.failures_in(GradingRound::Independent).count();
            let round2 = result.failures_in(GradingRound::Deliberation).count();
            output.push_str(&format!(
                "{} deliberated; dropped {} grader(s) in round 1, {} in round 2\n",
                "Council:".dimmed(),
                round1,
                round2
            ));
        }

        output
    }

    fn round_section(round: GradingRound, grades: &[GraderResult]) -> String {
        let mut output = Self::section_header(round.display_name());
        for grade in grades {
            output.push_str(&format!(
                "\n{} {}\n",
                format!("── {} ──", grade.model).yellow().bold(),
                format!(
                    "confidence {:.2}, {} ms, {}+{} tokens",
                    grade.confidence,
                    grade.latency_ms,
                    grade.prompt_tokens,
                    grade.completion_tokens
                )
                .dimmed()
            ));
            for score in &grade.scores {
                output.push_str(&Self::score_line(score));
            }
            if !grade.overall_feedback.is_empty() {
                output.push_str(&format!("{}\n", Self::indent(&grade.overall_feedback, "  ")));
            }
        }
        output
    }

    fn final_grade(result: &CouncilResult) -> String {
        let grade = &result.final_grade;
        let mut output = String::new();

        for score in &grade.scores {
            output.push_str(&Self::score_line(score));
            if !score.evidence.is_empty() {
                output.push_str(&format!(
                    "{}\n",
                    Self::indent(&format!("evidence: {}", score.evidence), "      ").dimmed()
                ));
            }
        }

        let total = format!(
            "{:.2} / {:.2} ({:.2}%)",
            grade.total_score, grade.max_possible_score, grade.percentage
        );
        output.push_str(&format!("\n{} {}\n", "Total:".green().bold(), total.bold()));

        if !grade.overall_feedback.is_empty() {
            output.push_str(&format!(
                "\n{}\n{}\n",
                "Feedback:".cyan().bold(),
                grade.overall_feedback
            ));
        }
        output
    }

    fn score_line(score: &CategoryScore) -> String {
        format!(
            "  {:<24} {:>6.2} / {:<6.2} {}\n",
            score.category,
            score.score,
            score.max_score,
            score.feedback.dimmed()
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &CouncilResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &CouncilResult) -> String {
        Self::format_json(result)
    }

    fn format_summary(&self, result: &CouncilResult) -> String {
        Self::format_summary(result)
    }
}
