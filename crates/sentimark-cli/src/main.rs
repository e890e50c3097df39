//! Sentimark CLI
//!
//! Loads the sentiment artifacts once and classifies text from the command
//! line or stdin, one JSON object per input on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use sentimark_pipeline::{telemetry, PipelineConfig, SentimentPipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

mod output;

use output::{PredictionLine, StatusReport};

/// Exit code when the artifacts failed to load
const EXIT_UNAVAILABLE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "sentimark")]
#[command(about = "Binary sentiment classification over pre-trained artifacts", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SENTIMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the vectorizer and classifier artifacts
    #[arg(short, long)]
    models_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a Prometheus metrics snapshot to stderr before exiting
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether the artifacts loaded
    Status,

    /// Classify each TEXT, or each stdin line when none is given
    Predict {
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let metrics_handle = if cli.metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.models_dir {
        config.artifacts.models_dir = dir;
    }
    info!(
        vectorizer = %config.artifacts.vectorizer_path().display(),
        classifier = %config.artifacts.classifier_path().display(),
        "Configuration loaded"
    );

    let pipeline = SentimentPipeline::initialize(&config);

    let code = match cli.command {
        Command::Status => status(&pipeline)?,
        Command::Predict { text } => {
            predict(&pipeline, text).await?;
            ExitCode::SUCCESS
        }
    };

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(code)
}

fn status(pipeline: &SentimentPipeline) -> Result<ExitCode> {
    let report = StatusReport::new(pipeline.state());
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if pipeline.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNAVAILABLE)
    })
}

async fn predict(pipeline: &SentimentPipeline, texts: Vec<String>) -> Result<()> {
    if !texts.is_empty() {
        for text in texts {
            emit(pipeline, text).await?;
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        emit(pipeline, line).await?;
    }
    Ok(())
}

async fn emit(pipeline: &SentimentPipeline, text: String) -> Result<()> {
    let result = pipeline.predict_async(Some(text.clone())).await;
    let line = PredictionLine::new(text, &result);
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

/// Initialize tracing/logging on stderr
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("sentimark=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentimark=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Install the Prometheus recorder and register metric descriptions
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    telemetry::describe_metrics();

    info!("Metrics recorder initialized");
    Ok(handle)
}
