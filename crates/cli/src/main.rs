mod transport;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use transport::{Transport, TransportMode};
use voxline_core::logging::{self, LoggingConfig, PrivacyConfig};
use voxline_core::{Config, ConnectionMonitor, MessageSource};
use voxline_ui::{App, SessionExit, SessionLinks, SessionView};

/// Voxline - terminal client for voice assistant sessions
#[derive(Parser, Debug)]
#[command(name = "voxline")]
#[command(about = "Live transcript and controls for a voice assistant session", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the config file (default: ./voxline.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive session view
    Start {
        /// Drive the session from a JSONL replay script instead of the loopback transport
        #[arg(short, long, value_name = "FILE")]
        replay: Option<PathBuf>,
    },
    /// Print the resolved configuration
    Config,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from("voxline.toml"));
    let config = load_or_create_config(&config_path)?;

    if cli.verbose {
        println!("{} Using config: {}", "Info:".blue().bold(), config_path.display());
    }

    match cli.command {
        Commands::Start { replay } => cmd_start(config, replay, cli.verbose),
        Commands::Config => cmd_config(&config),
    }
}

/// Load config from file or create it from the example
fn load_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e));
    }

    println!("{} Config not found at {}", "Warning:".yellow().bold(), path.display());
    std::fs::write(path, Config::example()).context("Failed to create config")?;
    println!("{} Created config at {} from the example", "Success:".green().bold(), path.display());

    Config::from_toml_str(Config::example()).map_err(|e| anyhow::anyhow!("Failed to load example config: {}", e))
}

/// Start the interactive session view
fn cmd_start(config: Config, replay: Option<PathBuf>, verbose: bool) -> Result<()> {
    let mode = match &replay {
        Some(path) => TransportMode::Replay(transport::load_replay(path)?),
        None => TransportMode::Loopback,
    };

    if verbose {
        let transport = replay.as_ref().map_or_else(|| "loopback".to_string(), |p| p.display().to_string());
        println!("{} Agent: {}", "Info:".blue().bold(), config.display.agent_name.cyan());
        println!("{} Transport: {}", "Info:".blue().bold(), transport.cyan());
        println!("{} Scroll policy: {}", "Info:".blue().bold(), config.session.scroll_policy);
        println!(
            "{} Connection timeout: {} ms",
            "Info:".blue().bold(),
            config.session.connection_timeout_ms
        );
    }

    // The terminal belongs to the UI; logs only go to the file sink.
    let mut logging_config = LoggingConfig::from(config.logging.clone()).without_stderr();
    if config.session.debug {
        logging_config = logging_config.with_debug();
    }
    let privacy = logging_config.privacy.clone();
    let _log_guard = logging::init_logging(Some(logging_config)).context("Failed to initialise logging")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    match runtime.block_on(run_session(config, mode, privacy))? {
        SessionExit::Left => println!("{} Left the session", "Info:".blue().bold()),
        SessionExit::Ended(reason) => println!("{} Session ended: {}", "Info:".yellow().bold(), reason),
    }
    Ok(())
}

async fn run_session(config: Config, mode: TransportMode, privacy: PrivacyConfig) -> Result<SessionExit> {
    let source = MessageSource::new();
    let monitor = ConnectionMonitor::new();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let links = SessionLinks { feed: source.subscribe(), connection: monitor.subscribe(), commands: commands_tx };

    let cancel = CancellationToken::new();
    let transport = tokio::spawn(Transport::new(source, monitor, commands_rx).run(mode, cancel.clone()));

    let mut app = App::new(SessionView::mount(&config, links)).with_privacy(privacy);
    let ran = app.run().await;

    cancel.cancel();
    if let Err(e) = transport.await {
        tracing::warn!(error = %e, "transport task failed");
    }

    ran.context("Terminal error")?;
    app.finish().context("Session failed")
}

/// Print the resolved configuration
fn cmd_config(config: &Config) -> Result<()> {
    let rendered = config.to_toml_string().map_err(|e| anyhow::anyhow!("Failed to render config: {}", e))?;
    println!("{}", "Voxline Configuration".green().bold().underline());
    println!();
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["voxline", "config"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::try_parse_from(["voxline", "--config", "/path/to/config.toml", "config"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.toml")));
    }

    #[test]
    fn test_cli_start_command() {
        let cli = Cli::try_parse_from(["voxline", "start"]).unwrap();
        assert!(matches!(cli.command, Commands::Start { replay: None }));

        let cli = Cli::try_parse_from(["voxline", "-v", "start", "--replay", "cafe.jsonl"]).unwrap();
        assert!(cli.verbose);
        if let Commands::Start { replay } = cli.command {
            assert_eq!(replay, Some(PathBuf::from("cafe.jsonl")));
        } else {
            panic!("Expected Start command");
        }
    }

    #[test]
    fn test_load_or_create_config_existing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "[display]\nagent_name = \"Barista\"\n").unwrap();

        let config = load_or_create_config(&config_path).unwrap();
        assert_eq!(config.display.agent_name, "Barista");
        assert!(config.session.supports_chat_input);
    }

    #[test]
    fn test_load_or_create_config_not_existing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");

        let config = load_or_create_config(&config_path).unwrap();
        assert!(config_path.exists());
        assert_eq!(config.session.connection_timeout_ms, 200_000);

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[session]"));
    }

    #[test]
    fn test_load_or_create_config_invalid() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "invalid toml").unwrap();

        assert!(load_or_create_config(&config_path).is_err());
    }

    #[test]
    fn test_cmd_config() {
        assert!(cmd_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_start_rejects_missing_replay() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.jsonl");

        let err = cmd_start(Config::default(), Some(missing), false).unwrap_err();
        assert!(err.to_string().contains("replay"));
    }
}
