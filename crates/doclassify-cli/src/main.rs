//! Doclassify CLI
//!
//! Command-line front end: reads a document, drives a request controller
//! against the configured inference service, and prints the outcome.

use anyhow::{bail, Context, Result};
use clap::Parser;
use doclassify_client::{ClientConfig, ConfigOverrides, HttpClassificationService};
use doclassify_controller::{RequestController, SubmitOutcome};
use doclassify_core::{ClassificationOutcome, MIN_DOCUMENT_CHARS};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Classify {
            text,
            file,
            top_k,
            threshold,
            timeout_ms,
            json,
        } => {
            let overrides = ConfigOverrides {
                endpoint: cli.endpoint,
                top_k,
                threshold,
                request_timeout_ms: timeout_ms,
            };
            let config = ClientConfig::load(&cli.config, &overrides)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            info!("Endpoint: {}", config.endpoint);

            let document = read_document(text, file)?;
            classify(&config, document, json).await?;
        }

        Commands::Health => {
            let overrides = ConfigOverrides {
                endpoint: cli.endpoint,
                ..Default::default()
            };
            let config = ClientConfig::load(&cli.config, &overrides)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            let service = HttpClassificationService::new(&config)?;

            match service.health().await {
                Ok(status) => println!(
                    "{} is up ({})",
                    config.endpoint,
                    status.status.as_deref().unwrap_or("ok")
                ),
                Err(reason) => bail!("{} is not healthy: {reason}", config.endpoint),
            }
        }
    }

    Ok(())
}

async fn classify(config: &ClientConfig, document: String, json: bool) -> Result<()> {
    let service = HttpClassificationService::new(config)?;
    let controller = RequestController::new(Arc::new(service))
        .with_params(config.params()?)
        .with_timeout(config.request_timeout());

    controller.edit(document);
    match controller.submit().await {
        SubmitOutcome::Settled(Ok(outcome)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
            Ok(())
        }
        SubmitOutcome::Settled(Err(reason)) => {
            bail!("classification failed ({}): {reason}", reason.kind())
        }
        SubmitOutcome::Ineligible => {
            eprintln!("Document needs at least {MIN_DOCUMENT_CHARS} characters; nothing sent.");
            Ok(())
        }
        SubmitOutcome::Busy | SubmitOutcome::Cancelled => {
            bail!("classification did not complete")
        }
    }
}

fn read_document(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()));
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading document from stdin")?;
    Ok(buf)
}

fn print_outcome(outcome: &ClassificationOutcome) {
    println!();
    println!("  Predicted label: {}", outcome.label);
    println!("  Confidence:      {:.1}%", outcome.confidence * 100.0);
    if outcome.abstained {
        println!("  Low confidence - needs review");
    }
    println!();
    println!("  Top predictions:");
    for (rank, entry) in outcome.top_k.iter().enumerate() {
        println!(
            "    {}. {:<20} {:>5.1}%",
            rank + 1,
            entry.label,
            entry.confidence * 100.0
        );
    }
    println!();
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        "doclassify=debug,doclassify_client=debug,doclassify_controller=debug"
    } else {
        "doclassify=warn,doclassify_client=warn,doclassify_controller=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
