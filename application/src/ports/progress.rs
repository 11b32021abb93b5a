//! Progress notification port
//!
//! Defines the interface for reporting progress during a council run.

use council_domain::{GradingRound, Model};

/// Callback for progress updates during a council run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a round's fan-out starts
    fn on_round_start(&self, round: GradingRound, total_graders: usize);

    /// Called when one grader finishes within a round
    fn on_grader_complete(&self, round: GradingRound, model: &Model, success: bool);

    /// Called when every grader of a round has finished
    fn on_round_complete(&self, round: GradingRound);

    /// Called after the agreement over a round's results is computed
    fn on_agreement(&self, _round: GradingRound, _agreement: f64, _threshold: f64) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_round_start(&self, _round: GradingRound, _total_graders: usize) {}
    fn on_grader_complete(&self, _round: GradingRound, _model: &Model, _success: bool) {}
    fn on_round_complete(&self, _round: GradingRound) {}
}
