//! Error types for `encore-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown collectible kind: {0:?}")]
  UnknownCollectibleKind(String),

  #[error("unknown mint status: {0:?}")]
  UnknownMintStatus(String),

  #[error("record key {0} segment is empty")]
  EmptyKeySegment(&'static str),

  #[error("record key {0} segment may not contain '|': {1:?}")]
  KeySegmentSeparator(&'static str, String),

  #[error("malformed record key: {0:?}")]
  MalformedKey(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
