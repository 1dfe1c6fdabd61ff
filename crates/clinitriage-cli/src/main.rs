//! clinitriage: command-line front end for the triage engine.
//! Reads a lab payload or an image-model output file and prints the report as JSON.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clinitriage_config::TriageConfig;
use clinitriage_engine::{KnowledgeBase, ReportAssembler};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "clinitriage", version, about = "Clinical triage reports from lab panels and lesion model output")]
struct Cli {
    /// Config file (TOML, YAML or JSON); overrides CLINITRIAGE_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interpret a blood panel (.json or .csv)
    Blood {
        file: PathBuf,
    },
    /// Classify a skin lesion from the image model's output document
    Image {
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(TriageConfig::discover);
    let config = match &config_path {
        Some(path) => TriageConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TriageConfig::default(),
    };

    // Initialise structured logging on stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => info!("no config file found, using defaults"),
    }

    let knowledge = KnowledgeBase::standard();
    let assembler = ReportAssembler::new(&knowledge, &config);

    let output = match &cli.command {
        Command::Blood { file } => commands::blood(&assembler, file)?,
        Command::Image { file } => commands::image(&assembler, file)?,
    };

    println!("{output}");
    Ok(())
}
