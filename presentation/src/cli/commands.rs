//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Final grade plus every grader's scores per round
    Full,
    /// Final grade and agreement only
    Summary,
    /// Council result as JSON
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for grading-council
#[derive(Parser, Debug)]
#[command(name = "grading-council")]
#[command(author, version, about = "Grading council - several LLMs score a transcript against a rubric")]
#[command(long_about = r#"
Grading Council scores a transcript with several LLM graders and combines
their grades.

The process has up to two rounds:
1. Independent grading: every model grades the transcript in parallel
2. Deliberation: if the graders disagree, each one sees the round-1 scores
   and grades again

The surviving grades are averaged per category and weighted by the rubric.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/grading-council/config.toml   Global config

Example:
  grading-council --transcript session.txt --rubric rubric.toml
  grading-council -t session.txt -r rubric.json -m gpt-4o -m claude-3-5-sonnet-20241022 --threshold 0.9
"#)]
pub struct Cli {
    /// Transcript file to grade
    #[arg(short, long, value_name = "FILE", required_unless_present = "show_config")]
    pub transcript: Option<PathBuf>,

    /// Rubric file (.toml with [[categories]] or .json array)
    #[arg(short, long, value_name = "FILE", required_unless_present = "show_config")]
    pub rubric: Option<PathBuf>,

    /// Models to include in the council (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Agreement needed to skip deliberation, in [0, 1]
    #[arg(long, value_name = "F")]
    pub threshold: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
