//! Collectible records — the persistent unit of the achievement engine.
//!
//! A collectible is either the per-(user, artist) accumulator of listened
//! milliseconds, or an append-only milestone marker created exactly once
//! when a listening threshold is first crossed. Markers are never mutated
//! after creation; the accumulator only ever grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  artist::ArtistRecord,
  profile::UserSnapshot,
};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The achievement kind, doubling as the key discriminant in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectibleKind {
  /// The running accumulator; the only mutable collectible.
  StreamedMilliseconds,
  Streamed01Hour,
  Streamed05Hours,
  Streamed10Hours,
  Streamed15Hours,
  Streamed25Hours,
  /// One-shot marker for listening within 24 hours of an album release.
  StreamedTrackInFirst24Hours,
}

impl CollectibleKind {
  /// The discriminant string used in record keys and stored columns.
  /// Must match the `rename_all = "camelCase"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::StreamedMilliseconds => "streamedMilliseconds",
      Self::Streamed01Hour => "streamed01Hour",
      Self::Streamed05Hours => "streamed05Hours",
      Self::Streamed10Hours => "streamed10Hours",
      Self::Streamed15Hours => "streamed15Hours",
      Self::Streamed25Hours => "streamed25Hours",
      Self::StreamedTrackInFirst24Hours => "streamedTrackInFirst24Hours",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    match s {
      "streamedMilliseconds" => Ok(Self::StreamedMilliseconds),
      "streamed01Hour" => Ok(Self::Streamed01Hour),
      "streamed05Hours" => Ok(Self::Streamed05Hours),
      "streamed10Hours" => Ok(Self::Streamed10Hours),
      "streamed15Hours" => Ok(Self::Streamed15Hours),
      "streamed25Hours" => Ok(Self::Streamed25Hours),
      "streamedTrackInFirst24Hours" => Ok(Self::StreamedTrackInFirst24Hours),
      other => Err(Error::UnknownCollectibleKind(other.to_owned())),
    }
  }

  /// Human label used in notification copy; `None` for the kinds that
  /// never appear there.
  pub fn display_name(&self) -> Option<&'static str> {
    match self {
      Self::Streamed01Hour => Some("1 Hour Listening"),
      Self::Streamed05Hours => Some("5 Hours Listening"),
      Self::Streamed10Hours => Some("10 Hours Listening"),
      Self::Streamed15Hours => Some("15 Hours Listening"),
      Self::Streamed25Hours => Some("25 Hours Listening"),
      Self::StreamedMilliseconds | Self::StreamedTrackInFirst24Hours => None,
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Issuance status of a milestone marker. The accumulator carries no
/// status; an absent status is what marks a record as still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MintStatus {
  /// Eligible for downstream issuance (external to this engine).
  ReadyToMint,
  Minted,
}

impl MintStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ReadyToMint => "readyToMint",
      Self::Minted => "minted",
    }
  }

  pub fn from_str(s: &str) -> Result<Self> {
    match s {
      "readyToMint" => Ok(Self::ReadyToMint),
      "minted" => Ok(Self::Minted),
      other => Err(Error::UnknownMintStatus(other.to_owned())),
    }
  }
}

// ─── Track snapshot ──────────────────────────────────────────────────────────

/// The playback that triggered a first-24-hours marker, denormalized onto
/// the record for notification rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSnapshot {
  pub id:         String,
  pub name:       String,
  pub album_id:   String,
  pub album_name: String,
  pub played_at:  DateTime<Utc>,
  pub context:    Option<String>,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted collectible. Identity is `(user_id, kind, artist.id)`;
/// there is at most one record per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectibleRecord {
  pub user_id:     String,
  pub kind:        CollectibleKind,
  pub streamed_ms: u64,
  pub status:      Option<MintStatus>,
  /// Store-assigned; never changes after creation.
  pub created:     DateTime<Utc>,
  /// Bumped on every accumulator increment; equals `created` until then.
  pub updated:     DateTime<Utc>,
  pub artist:      ArtistRecord,
  pub user:        UserSnapshot,
  pub track:       Option<TrackSnapshot>,
}

impl CollectibleRecord {
  pub fn is_accumulator(&self) -> bool {
    self.kind == CollectibleKind::StreamedMilliseconds
  }

  /// True once the accumulator has been incremented at least once since
  /// creation.
  pub fn touched_since_creation(&self) -> bool { self.updated > self.created }
}

// ─── NewCollectible ──────────────────────────────────────────────────────────

/// Input to [`crate::store::CollectibleStore::create_collectible`].
/// `created` and `updated` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewCollectible {
  pub user_id:     String,
  pub kind:        CollectibleKind,
  pub streamed_ms: u64,
  pub status:      Option<MintStatus>,
  pub artist:      ArtistRecord,
  pub user:        UserSnapshot,
  pub track:       Option<TrackSnapshot>,
}

impl NewCollectible {
  /// A fresh accumulator holding the first observed play's duration.
  pub fn accumulator(
    user_id: impl Into<String>,
    artist: ArtistRecord,
    user: UserSnapshot,
    streamed_ms: u64,
  ) -> Self {
    Self {
      user_id: user_id.into(),
      kind: CollectibleKind::StreamedMilliseconds,
      streamed_ms,
      status: None,
      artist,
      user,
      track: None,
    }
  }

  /// A milestone marker, born `ReadyToMint`.
  pub fn milestone(
    user_id: impl Into<String>,
    kind: CollectibleKind,
    artist: ArtistRecord,
    user: UserSnapshot,
    streamed_ms: u64,
  ) -> Self {
    Self {
      user_id: user_id.into(),
      kind,
      streamed_ms,
      status: Some(MintStatus::ReadyToMint),
      artist,
      user,
      track: None,
    }
  }
}
