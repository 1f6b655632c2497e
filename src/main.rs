//! Market Matcher - Binary Entry Point
//!
//! `run` reads action messages as JSON lines on stdin and writes outcomes
//! as JSON lines on stdout. Logs go to stderr.

use std::io::{self, BufRead};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use market_matcher::{config, Dispatcher, EngineRegistry, JsonLinesSink, MemoryStore, ReloadTarget};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "market-matcher", about = "Per-market order matching core")]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match actions read from stdin
    Run,
    /// Replay the backlog of every enabled market and print the receipts
    Check,
}

fn init_logging(cfg: &config::AppConfig) {
    let level: tracing::level_filters::LevelFilter = cfg.logger.level.into();
    match cfg.logger.format {
        config::LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_max_level(level)
                .with_current_span(true)
                .with_writer(io::stderr)
                .init();
        }
        config::LogFormat::Compact => {
            tracing_subscriber::fmt()
                .compact()
                .with_max_level(level)
                .with_writer(io::stderr)
                .init();
        }
    }
}

fn open_store(cfg: &config::AppConfig) -> Result<Arc<MemoryStore>, String> {
    let store = MemoryStore::new(cfg.markets.clone());
    if let Some(path) = &cfg.backlog_path {
        let count = store.load_backlog(path).map_err(|e| e.to_string())?;
        info!(orders = count, path = %path.display(), "backlog loaded");
    }
    Ok(Arc::new(store))
}

fn run(cfg: &config::AppConfig) -> Result<(), String> {
    let store = open_store(cfg)?;
    let registry = EngineRegistry::bootstrap(store.clone(), store.clone()).map_err(|e| e.to_string())?;
    info!(markets = ?registry.markets(), "engines ready");

    let sink = Arc::new((store, JsonLinesSink::stdout()));
    let dispatcher = Dispatcher::new(Arc::new(registry), sink);

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| format!("failed to read stdin: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }
        // Outcomes reach stdout through the sink
        drop(dispatcher.route(line.as_bytes()));
    }

    dispatcher.shutdown();
    Ok(())
}

fn check(cfg: &config::AppConfig) -> Result<(), String> {
    let store = open_store(cfg)?;
    let registry = EngineRegistry::new(store.clone(), store);
    let receipts = registry.reload(&ReloadTarget::All).map_err(|e| e.to_string())?;

    let enabled = cfg.enabled_markets().count();
    if receipts.len() < enabled {
        warn!(enabled, loaded = receipts.len(), "some markets failed to load");
    }

    let rendered = serde_json::to_string_pretty(&receipts).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match config::AppConfig::load(Path::new(&cli.config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    let result = match cli.command {
        Commands::Run => run(&config),
        Commands::Check => check(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "matcher failed");
            ExitCode::FAILURE
        }
    }
}
