use clap::{Parser, Subcommand};
use insight_engine::config::{LoggingSettings, Settings, TaxonomySettings};
use insight_engine::models::ErrorResponse;
use insight_engine::{
    AggregateError, KeywordScorer, MetricsError, MetricsStore, ModelEstimate, ModelMetrics,
    PredictionAggregator, TaxonomyError,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Resume keyword scoring and salary prediction aggregation
#[derive(Parser)]
#[command(name = "insight-engine", version)]
struct Cli {
    /// Configuration file. Defaults to config/default.toml and config/local.toml.
    #[arg(long, env = "INSIGHT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score resume text against a role's keyword taxonomy
    Score {
        /// Target role, matched case-insensitively (e.g. "data scientist")
        #[arg(long)]
        role: String,

        /// Resume text. Read from --file or stdin when omitted.
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// File holding the resume text
        #[arg(long)]
        file: Option<PathBuf>,

        /// Substitute taxonomy file (TOML `[[roles]]` tables)
        #[arg(long)]
        taxonomy: Option<PathBuf>,
    },

    /// Combine per-model salary estimates into one prediction
    Aggregate {
        /// JSON object mapping model identifier to estimate,
        /// e.g. '{"random_forest": 612000}'
        #[arg(long)]
        estimates: String,

        /// Model to use as the active model when it has an estimate
        #[arg(long)]
        model: Option<String>,

        /// Metrics artifact path (overrides metrics.artifact_path)
        #[arg(long, conflicts_with = "no_metrics")]
        metrics: Option<PathBuf>,

        /// Aggregate without consulting the metrics artifact
        #[arg(long)]
        no_metrics: bool,
    },

    /// Summarize the metrics artifact written by the training run
    Metrics {
        /// Metrics artifact path (overrides metrics.artifact_path)
        #[arg(long)]
        metrics: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn kind(&self) -> &'static str {
        match self {
            CliError::Config(_) => "config_error",
            CliError::Taxonomy(_) => "invalid_taxonomy",
            CliError::Aggregate(_) => "invalid_input",
            CliError::Metrics(_) => "metrics_unavailable",
            CliError::Io(_) => "io_error",
            CliError::Json(_) => "invalid_json",
        }
    }
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings::default());
            return report(e.into());
        }
    };

    init_logging(&settings.logging);

    match run(cli.command, &settings) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, ::config::ConfigError> {
    match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

/// Logs go to stderr so stdout carries only the JSON result
fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn error_response(err: &CliError) -> ErrorResponse {
    ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
    }
}

fn report(err: CliError) -> ExitCode {
    error!("{}", err);

    let response = error_response(&err);
    match serde_json::to_string(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{}: {} ({})", response.error, response.message, e),
    }

    ExitCode::FAILURE
}

fn run(command: Command, settings: &Settings) -> Result<String, CliError> {
    match command {
        Command::Score {
            role,
            text,
            file,
            taxonomy,
        } => {
            let (mut role_taxonomy, weights) = settings.scoring_tables()?;
            if let Some(path) = taxonomy {
                role_taxonomy = TaxonomySettings::from_file(&path)?.to_taxonomy();
                info!("Loaded {} roles from {}", role_taxonomy.len(), path.display());
            }

            let resume_text = read_resume(text, file)?;
            let scorer = KeywordScorer::new(role_taxonomy, weights);
            let result = scorer.score(&role, &resume_text);

            info!(
                "Scored resume for role '{}': {} ({} matched, {} missing)",
                role,
                result.score,
                result.matched_keywords.len(),
                result.missing_keywords.len()
            );

            Ok(serde_json::to_string_pretty(&result)?)
        }
        Command::Aggregate {
            estimates,
            model,
            metrics,
            no_metrics,
        } => {
            let estimates: ModelEstimate = serde_json::from_str(&estimates)?;
            let metrics = if no_metrics {
                None
            } else {
                load_metrics_for_aggregation(&metrics_store(settings, metrics))
            };

            let prediction = PredictionAggregator::new().aggregate_with_selection(
                estimates,
                metrics.as_ref(),
                model.as_deref(),
            )?;

            info!(
                "Aggregated prediction: recommended={:.2} (active_model={:?}, ensemble={:.2})",
                prediction.recommended(),
                prediction.active_model,
                prediction.ensemble
            );

            Ok(serde_json::to_string_pretty(&prediction)?)
        }
        Command::Metrics { metrics } => {
            let summary = metrics_store(settings, metrics)
                .load()?
                .map(|m| m.summary());

            if summary.is_none() {
                info!("No metrics artifact found, train models first");
            }

            Ok(serde_json::to_string_pretty(&summary)?)
        }
    }
}

fn metrics_store(settings: &Settings, path: Option<PathBuf>) -> MetricsStore {
    MetricsStore::new(path.unwrap_or_else(|| settings.metrics.artifact_path.clone()))
}

/// An unreadable artifact degrades to "no metrics" rather than failing the prediction
fn load_metrics_for_aggregation(store: &MetricsStore) -> Option<ModelMetrics> {
    match store.load() {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!("Ignoring metrics artifact, aggregating without it: {}", e);
            None
        }
    }
}

fn read_resume(text: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
