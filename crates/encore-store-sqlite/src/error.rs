//! Error type for `encore-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] encore_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted a partial update against a collectible that was never
  /// created.
  #[error("collectible not found: {0}")]
  CollectibleNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
