//! Settings: defaults, then the optional TOML file, then `HOURGLASS_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Which [`ActivityStore`](hourglass_core::ActivityStore) implementation to
/// use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Sql,
  Csv,
}

impl Backend {
  fn as_str(self) -> &'static str {
    match self {
      Self::Sql => "sql",
      Self::Csv => "csv",
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub backend:  Backend,
  pub sql_path: PathBuf,
  pub csv_path: PathBuf,
}

/// Values given on the command line; `None` leaves lower layers in charge.
#[derive(Debug, Default)]
pub struct Overrides {
  pub backend: Option<Backend>,
  pub store:   Option<PathBuf>,
}

impl Settings {
  /// Load settings from `file` (if it exists) and the environment, then apply
  /// `overrides`. Paths come back with `~` expanded.
  pub fn load(file: &Path, overrides: Overrides) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("backend", Backend::Sql.as_str())?
      .set_default("sql_path", "~/.hourglass.db")?
      .set_default("csv_path", "~/.hourglass.csv")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("HOURGLASS"))
      .set_override_option("backend", overrides.backend.map(Backend::as_str))?
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;

    if let Some(store) = overrides.store {
      match settings.backend {
        Backend::Sql => settings.sql_path = store,
        Backend::Csv => settings.csv_path = store,
      }
    }
    settings.sql_path = expand_tilde(&settings.sql_path);
    settings.csv_path = expand_tilde(&settings.csv_path);
    Ok(settings)
  }

  /// The store file for the selected backend.
  pub fn store_path(&self) -> &Path {
    match self.backend {
      Backend::Sql => &self.sql_path,
      Backend::Csv => &self.csv_path,
    }
  }
}

/// `~/.config/hourglass/config.toml`, or a relative `config.toml` if `HOME`
/// is unset.
pub fn default_config_file() -> PathBuf {
  expand_tilde(Path::new("~/.config/hourglass/config.toml"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
