//! The `ListeningSource` trait — the streaming provider seen from the
//! accrual engine.
//!
//! Access-token refresh is deliberately not part of this trait: it is a
//! setup-phase concern of the concrete client. A `ListeningSource` value
//! represents an already-authorized session.

use std::future::Future;

use thiserror::Error;

use crate::{
  artist::ArtistRecord,
  play::{AlbumRef, PlayEvent},
};

/// The full error taxonomy of a provider call. Reported as a value,
/// never raised; the coordinator decides per call site whether to abort
/// or to skip the item.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
  /// The access token was rejected. Surfaced to the caller; nothing in a
  /// single run can recover from it.
  #[error("streaming provider rejected the access token")]
  Unauthorized,

  /// Any other failure: 5xx, network, malformed payload. Retrying on the
  /// next scheduled run is expected to succeed.
  #[error("transient streaming provider failure: {0}")]
  Transient(String),
}

pub trait ListeningSource: Send + Sync {
  /// The user's recently played tracks, most recent first, capped at
  /// `limit`.
  fn recently_played(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PlayEvent>, SourceError>> + Send + '_;

  /// Full artist metadata for one artist id.
  fn artist<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<ArtistRecord, SourceError>> + Send + 'a;

  /// The provider's current new-release albums, capped at `limit`.
  fn new_releases(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<AlbumRef>, SourceError>> + Send + '_;
}
