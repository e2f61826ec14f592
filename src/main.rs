mod app;
mod backup;
mod commands;
mod config;
mod domain;
mod event;
mod query;
mod shell;
mod store;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "applyflow")]
#[command(about = "A terminal UI for tracking job applications, offline-first")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/applyflow/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Data directory for the database and logs (default: platform data dir)
  #[arg(short, long)]
  data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Resolve the data directory: flag > default next to the database
  let data_dir = match &args.data_dir {
    Some(dir) => dir.clone(),
    None => store::SqliteBackend::default_path()?
      .parent()
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from(".")),
  };

  // The TUI owns the terminal, so logs go to a file
  let _log_guard = init_tracing(&data_dir)?;

  // Open the store
  let db_path = config
    .store
    .path
    .clone()
    .unwrap_or_else(|| data_dir.join("applyflow.db"));
  let store = store::Store::new(store::SqliteBackend::open(&db_path)?);

  // Shell cache, only when a shell host is configured
  let shell_controller = match &config.shell {
    Some(shell_config) => Some(shell::ShellController::new(
      shell::HttpFetcher::new(&shell_config.base_url)?,
      shell::SqliteAssets::open(&data_dir.join("shell.db"))?,
    )),
    None => None,
  };

  // Initialize and run the app
  let mut app = app::App::new(config, store, shell_controller);
  app.run().await?;

  Ok(())
}

fn init_tracing(data_dir: &std::path::Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
  std::fs::create_dir_all(data_dir)?;

  let file_appender = tracing_appender::rolling::never(data_dir, "applyflow.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_env("APPLYFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
