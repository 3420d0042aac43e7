use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use campus_assistant::{AssistantConfig, AssistantTelemetry, CampusAssistant, ConversationContext};
use clap::{Parser, Subcommand};
use serde_json::json;
use shared_logging::LogLevel;
use tokio::runtime::Runtime;

mod console;

#[derive(Parser, Debug)]
#[command(name = "campus", version, about = "Answers questions about the university catalog")]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the catalog path from the config.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answers a single question.
    Ask {
        /// Prints the extracted entities before the answer.
        #[arg(long)]
        explain: bool,
        /// Question words.
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Reads JSON commands from stdin, one per line.
    Console,
    /// Replaces the catalog with a JSON array file.
    Upload { file: PathBuf },
    /// Lists catalog records sorted by name.
    List,
    /// Shows public/private counts.
    Stats,
    /// Re-reads the catalog and reports the record count.
    Reload,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let telemetry = AssistantTelemetry::from_settings("campus.cli", &config.logging)?;
    let assistant = CampusAssistant::open(&config)?;

    if let Err(err) = assistant.rebuild() {
        eprintln!("warning: {err}");
        if let Some(tel) = &telemetry {
            let _ = tel.log(
                LogLevel::Warn,
                "cli.catalog.unavailable",
                json!({ "error": err.to_string(), "kind": err.kind() }),
            );
        }
    }

    match cli.command {
        Commands::Ask { explain, question } => {
            let question = question.join(" ");
            if explain {
                println!("{}", serde_json::to_string_pretty(&assistant.extract(&question))?);
            }
            let (response, _) = assistant.answer(&question, &ConversationContext::default());
            println!("{response}");
            Ok(())
        }
        Commands::Console => {
            let rt = Runtime::new().context("starting console runtime")?;
            rt.block_on(console::run_stdin(assistant, telemetry))
        }
        Commands::Upload { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("reading upload {}", file.display()))?;
            let count = assistant.upload(&raw)?;
            println!(
                "catalog replaced: {count} universities in {}",
                assistant.store().source().path().display()
            );
            Ok(())
        }
        Commands::List => {
            assistant.ensure_catalog()?;
            for record in assistant.listing() {
                println!(
                    "{} | {} | {} | {}",
                    record.name,
                    record.city,
                    record.status.map_or("-", |status| status.label()),
                    record.website.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Commands::Stats => {
            assistant.ensure_catalog()?;
            println!("{}", serde_json::to_string_pretty(&assistant.stats())?);
            Ok(())
        }
        Commands::Reload => {
            let count = assistant.rebuild()?;
            println!("catalog reloaded: {count} universities");
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<AssistantConfig> {
    let config = match &cli.config {
        Some(path) => AssistantConfig::load(path)?,
        None => AssistantConfig::default(),
    };
    Ok(match &cli.catalog {
        Some(path) => config.with_catalog_path(path),
        None => config,
    })
}
