//! Progress reporting for council execution

use colored::Colorize;
use council_application::ports::progress::ProgressNotifier;
use council_domain::{GradingRound, Model};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a council run with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn round_short_name(round: GradingRound) -> &'static str {
        match round {
            GradingRound::Independent => "Round 1",
            GradingRound::Deliberation => "Round 2",
        }
    }

    fn agreement_line(agreement: f64, threshold: f64) -> String {
        let verdict = if agreement >= threshold {
            "graders agree".green()
        } else {
            "below threshold, deliberating".yellow()
        };
        format!("agreement {agreement:.3} (threshold {threshold:.2}): {verdict}")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_round_start(&self, round: GradingRound, total_graders: usize) {
        let pb = self.multi.add(ProgressBar::new(total_graders as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(round.display_name().to_string());
        pb.set_message("Grading...");

        if let Ok(mut slot) = self.round_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_grader_complete(&self, _round: GradingRound, model: &Model, success: bool) {
        if let Ok(slot) = self.round_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), model)
            } else {
                format!("{} {}", "x".red(), model)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, round: GradingRound) {
        if let Ok(mut slot) = self.round_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{} complete!", Self::round_short_name(round).green()));
        }
    }

    fn on_agreement(&self, round: GradingRound, agreement: f64, threshold: f64) {
        // Round 2 agreement is informational only
        if round == GradingRound::Independent {
            let _ = self
                .multi
                .println(format!("  {}", Self::agreement_line(agreement, threshold)));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_round_start(&self, round: GradingRound, total_graders: usize) {
        eprintln!(
            "{} {} ({} graders)",
            "->".cyan(),
            round.display_name().bold(),
            total_graders
        );
    }

    fn on_grader_complete(&self, _round: GradingRound, model: &Model, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), model);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_round_complete(&self, _round: GradingRound) {
        eprintln!();
    }

    fn on_agreement(&self, round: GradingRound, agreement: f64, threshold: f64) {
        if round == GradingRound::Independent {
            eprintln!("  {}", ProgressReporter::agreement_line(agreement, threshold));
        }
    }
}
