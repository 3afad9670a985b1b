//! CLI entry point for andy-chat

mod layout;
mod tui;

use andy_chat_client::{AnswerService, Conversation, HttpAnswerService};
use andy_chat_core::config::{Config, ConfigLoader, DEFAULT_API_BASE};
use andy_chat_core::logging::init_logging;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "andy-chat")]
#[command(about = "Ask questions about Andy from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Answer service base URL (overrides configuration)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up andy-chat configuration
    Onboard,
    /// Ask a single question
    Ask {
        /// Question to ask
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Launch the interactive chat
    Tui,
    /// Show configuration and answer service health
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };

    let mut config = loader
        .load()
        .with_context(|| format!("failed to load {}", loader.config_path().display()))?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    config.logging.dir = resolve_log_dir(loader.config_dir(), &config.logging.dir)
        .to_string_lossy()
        .into_owned();

    let console_logs = !matches!(cli.command, Commands::Tui);
    let _guard = init_logging(&config.logging, console_logs)?;

    match cli.command {
        Commands::Onboard => {
            info!("Running onboard");
            run_onboard(&loader, loader.load()?)?;
        }
        Commands::Ask { message } => {
            run_ask(&config, message).await?;
        }
        Commands::Tui => {
            info!("Starting TUI");
            let service = build_service(&config)?;
            tui::run_tui(&config, service).await?;
        }
        Commands::Status => {
            run_status(&loader, &config).await?;
        }
    }

    Ok(())
}

/// Relative log directories live under the config directory
fn resolve_log_dir(config_dir: &Path, dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

fn build_service(config: &Config) -> Result<Arc<dyn AnswerService>> {
    let service = HttpAnswerService::new(config.api.resolved_base_url())?;
    Ok(Arc::new(service))
}

async fn run_ask(config: &Config, message: Option<String>) -> Result<()> {
    let Some(message) = message.filter(|m| !m.trim().is_empty()) else {
        println!("Use --message to ask a question");
        println!("Example: andy-chat ask --message 'Who is Andy?'");
        return Ok(());
    };

    let service = build_service(config)?;
    let mut conversation = Conversation::new(service);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Asking Andy...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    conversation.submit(&message).await;
    spinner.finish_and_clear();

    if let Some(turn) = conversation.session().last_turn() {
        println!("{}", style("Andy:").bold().green());
        println!("{}", turn.text());
    }
    Ok(())
}

async fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    println!("{}", style("Andy Chat Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config file: {}", loader.config_path().display());
    println!("  Answer service: {}", config.api.resolved_base_url());
    println!("  Log directory: {}", config.logging.dir);
    println!("  Sidebar from: {} columns", config.ui.sidebar_min_width);
    println!();

    println!("{}", style("Answer service:").bold());
    let service = build_service(config)?;
    match service.health().await {
        Ok(report) => {
            let status = report.status.clone().unwrap_or_else(|| "unknown".to_string());
            let status = if report.is_healthy() {
                style(status).green()
            } else {
                style(status).yellow()
            };
            println!("  Status: {}", status);
            for (name, value) in [
                ("API configured", report.api_configured),
                ("API key valid", report.api_key_valid),
                ("Vector store connected", report.chromadb_connected),
                ("Document loaded", report.document_loaded),
                ("Document exists", report.document_exists),
            ] {
                println!("  {}: {}", name, flag(value));
            }
            if let Some(location) = &report.document_location {
                println!("  Document location: {}", location);
            }
        }
        Err(e) => {
            println!("  Status: {} ({})", style("unreachable").red(), e);
        }
    }
    Ok(())
}

fn flag(value: Option<bool>) -> console::StyledObject<&'static str> {
    match value {
        Some(true) => style("yes").green(),
        Some(false) => style("no").red(),
        None => style("unknown").dim(),
    }
}

fn run_onboard(loader: &ConfigLoader, mut config: Config) -> Result<()> {
    println!("{}", style("Andy Chat setup").bold().cyan());

    let base_url: String = Input::new()
        .with_prompt(format!("Answer service URL (empty for {})", DEFAULT_API_BASE))
        .with_initial_text(config.api.base_url.clone())
        .allow_empty(true)
        .interact_text()?;
    config.api.base_url = base_url.trim().to_string();

    let levels = ["error", "warn", "info", "debug", "trace"];
    let current = levels
        .iter()
        .position(|l| l.eq_ignore_ascii_case(&config.logging.level))
        .unwrap_or(2);
    let selected = Select::new()
        .with_prompt("Log level")
        .items(&levels)
        .default(current)
        .interact()?;
    config.logging.level = levels[selected].to_string();

    loader.save(&config)?;
    println!(
        "{} Saved {}",
        style("✓").green(),
        loader.config_path().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_log_dir() {
        let base = Path::new("/etc/andy-chat");
        assert_eq!(
            resolve_log_dir(base, "logs"),
            PathBuf::from("/etc/andy-chat/logs")
        );
        assert_eq!(
            resolve_log_dir(base, "/var/log/andy"),
            PathBuf::from("/var/log/andy")
        );
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "andy-chat",
            "ask",
            "--message",
            "Who is Andy?",
            "--api-url",
            "http://127.0.0.1:5000",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:5000"));
        match cli.command {
            Commands::Ask { message } => assert_eq!(message.as_deref(), Some("Who is Andy?")),
            _ => panic!("expected ask"),
        }
    }
}
