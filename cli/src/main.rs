//! CLI entrypoint for Grading Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{RunCouncilError, RunCouncilInput, RunCouncilUseCase};
use council_domain::{Model, OutputFormat};
use council_infrastructure::{
    ConfigLoader, CredentialResolver, FileConfig, RoutingGateway, RubricLoader,
};
use council_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting Grading Council");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    apply_cli_overrides(&mut config, &cli);

    let issues = config.validate();
    for issue in &issues {
        warn!("Config: {}", issue);
    }
    if FileConfig::has_errors(&issues) {
        let errors: Vec<String> = issues
            .iter()
            .filter(|i| i.is_error())
            .map(|i| i.to_string())
            .collect();
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Inputs ===
    let (Some(transcript_path), Some(rubric_path)) = (&cli.transcript, &cli.rubric) else {
        bail!("--transcript and --rubric are required");
    };
    let loader = RubricLoader::new();
    let transcript = loader
        .load_transcript(transcript_path)
        .context("Failed to load transcript")?;
    let rubric = loader.load(rubric_path).context("Failed to load rubric")?;

    let models = config.council.parse_models();
    let credential = CredentialResolver::new(&config.providers).resolve()?;
    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    let gateway = Arc::new(RoutingGateway::from_config(&config.providers));
    for model in &models {
        if let Some(provider) = gateway.provider_for(model)
            && !credential.has_key_for(provider)
        {
            warn!(
                model = %model,
                "No {} API key configured, this grader will be skipped",
                provider.display_name()
            );
        }
    }

    // Cancel in-flight grading on Ctrl-C
    let cancellation = CancellationToken::new();
    {
        let cancellation = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling council run");
                cancellation.cancel();
            }
        });
    }

    let input = RunCouncilInput::new(transcript, rubric, models.clone(), credential)
        .with_threshold(config.council.agreement_threshold)
        .with_cancellation(cancellation);

    // Print header
    let show_progress = !cli.quiet && config.output.show_progress;
    if show_progress && format != OutputFormat::Json {
        eprintln!();
        eprintln!("+============================================================+");
        eprintln!("|           Grading Council                                  |");
        eprintln!("+============================================================+");
        eprintln!();
        eprintln!("Graders: {}", join_models(&models));
        eprintln!(
            "Agreement threshold: {}",
            config.council.agreement_threshold
        );
        eprintln!();
    }

    // === Dependency Injection ===
    let use_case = RunCouncilUseCase::with_params(gateway, config.council.execution_params());

    // Execute with or without progress reporting
    let outcome = if show_progress {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    } else {
        use_case.execute(input).await
    };

    let result = match outcome {
        Ok(result) => result,
        Err(RunCouncilError::AllGradersFailed { failures }) => {
            let reasons: Vec<String> = failures
                .iter()
                .map(|f| format!("{}: {}", f.model, f.reason))
                .collect();
            bail!("Every grader failed:\n  {}", reasons.join("\n  "));
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", ConsoleFormatter.render(&result, format));

    Ok(())
}

/// Command-line flags win over every configuration source
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.model.is_empty() {
        config.council.models = cli.model.clone();
    }
    if let Some(threshold) = cli.threshold {
        config.council.agreement_threshold = threshold;
    }
}

fn join_models(models: &[Model]) -> String {
    models
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
