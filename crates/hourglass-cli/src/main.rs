//! `hourglass` — command-line time tracker.
//!
//! # Usage
//!
//! ```
//! hourglass start "write report" work writing
//! hourglass stop
//! hourglass list week
//! hourglass --csv --store ~/time.csv status
//! ```

mod commands;
mod report;
mod settings;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context as _, bail};
use clap::{CommandFactory as _, Parser};
use commands::{Command, CommandError, Tracker};
use hourglass_core::{ActivityStore, clock::SystemClock};
use hourglass_store_csv::CsvStore;
use hourglass_store_sqlite::SqliteStore;
use settings::{Backend, Overrides, Settings};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hourglass", version, about = "A tool for time tracking")]
struct Cli {
  /// Use the SQLite backend (the default).
  #[arg(long, conflicts_with = "csv")]
  sql: bool,

  /// Use the CSV backend.
  #[arg(long)]
  csv: bool,

  /// Store file for the selected backend.
  #[arg(long, value_name = "PATH")]
  store: Option<PathBuf>,

  /// Path to a TOML config file (backend, sql_path, csv_path).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// More log output on stderr; repeat for more.
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

impl Cli {
  fn overrides(&self) -> Overrides {
    let backend = if self.csv {
      Some(Backend::Csv)
    } else if self.sql {
      Some(Backend::Sql)
    } else {
      None
    };
    Overrides { backend, store: self.store.clone() }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> ExitCode {
  // Usage errors exit with status 2 from inside clap.
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      if let Some(CommandError::Syntax(_)) = err.downcast_ref::<CommandError>() {
        eprintln!("{err}");
        if let Some(sub) = Cli::command().find_subcommand_mut(cli.command.name()) {
          eprintln!("{}", sub.render_usage());
        }
        return ExitCode::from(2);
      }
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  };
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy(),
    )
    .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
  let config_file = cli.config.clone().unwrap_or_else(settings::default_config_file);
  let settings = Settings::load(&config_file, cli.overrides())?;
  let path = settings.store_path();
  info!(backend = ?settings.backend, path = %path.display(), "opening store");

  match settings.backend {
    Backend::Sql => execute(SqliteStore::new(path), cli),
    Backend::Csv => {
      let store = CsvStore::open(path)
        .with_context(|| format!("failed to open store at {}", path.display()))?;
      execute(store, cli)
    }
  }
}

/// Validate and migrate `store`, then run the command and print its output.
fn execute<S: ActivityStore>(store: S, cli: &Cli) -> anyhow::Result<()> {
  if !store.valid().context("failed to check store")? {
    bail!("store location is not usable (does its directory exist?)");
  }
  store.migrate().context("failed to migrate store")?;

  let output = Tracker::new(store, SystemClock).run(&cli.command)?;
  if !output.is_empty() {
    println!("{output}");
  }
  Ok(())
}
