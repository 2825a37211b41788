//! Worker configuration, deserialized from `config.toml` with
//! `ENCORE_`-prefixed environment overrides.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
  /// SQLite database file backing the achievement store.
  pub store_path:    PathBuf,
  /// TOML file read by [`crate::secrets::FileSecrets`].
  pub secrets_path:  PathBuf,
  /// How many recently played tracks to request per run.
  #[serde(default = "default_recent_limit")]
  pub recent_limit:  usize,
  #[serde(default)]
  pub pacing:        PacingConfig,
  pub notifications: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
  /// Minimum interval between store writes, in milliseconds. Zero
  /// disables pacing.
  #[serde(default = "default_write_interval_ms")]
  pub write_interval_ms: u64,
}

impl Default for PacingConfig {
  fn default() -> Self {
    Self { write_interval_ms: default_write_interval_ms() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
  /// The email service's send endpoint.
  pub endpoint:             String,
  #[serde(default = "default_true")]
  pub enabled:              bool,
  #[serde(default = "default_collectible_template")]
  pub collectible_template: String,
  #[serde(default = "default_collectible_subject")]
  pub collectible_subject:  String,
  #[serde(default = "default_weekly_template")]
  pub weekly_template:      String,
  #[serde(default = "default_weekly_subject")]
  pub weekly_subject:       String,
}

fn default_recent_limit() -> usize { 50 }
fn default_write_interval_ms() -> u64 { 500 }
fn default_true() -> bool { true }
fn default_collectible_template() -> String { "You've Earned a Collectible".to_owned() }
fn default_collectible_subject() -> String { "You Earned a Collectible 🎉".to_owned() }
fn default_weekly_template() -> String { "Weekly Progress Email".to_owned() }
fn default_weekly_subject() -> String { "Your Weekly Progress 📊".to_owned() }

impl WorkerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("ENCORE").separator("__"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise WorkerConfig")
  }

  pub fn write_interval(&self) -> Duration {
    Duration::from_millis(self.pacing.write_interval_ms)
  }
}
