//! Play events — the ephemeral input to accrual.
//!
//! One event per track playback, as reported by the streaming provider's
//! recently-played listing. Events are never persisted by this engine;
//! only their accumulated durations and the snapshots derived from them
//! are.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::artist::ImageRef;

/// A bare artist credit on a track, before the full artist lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCredit {
  pub id:   String,
  pub name: String,
}

/// Album reference carried on a play event or a new-release listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
  pub id:           String,
  pub name:         String,
  /// Month- and year-precision provider dates round down to the first
  /// day; `None` when the provider omitted the date entirely.
  pub release_date: Option<NaiveDate>,
  #[serde(default)]
  pub images:       Vec<ImageRef>,
  #[serde(default)]
  pub artists:      Vec<ArtistCredit>,
}

impl AlbumRef {
  /// Release instant used for the first-24-hours window: midnight UTC of
  /// the release date.
  pub fn released_at(&self) -> Option<DateTime<Utc>> {
    self
      .release_date
      .and_then(|d| d.and_hms_opt(0, 0, 0))
      .map(|dt| dt.and_utc())
  }
}

/// The track attached to a play event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedTrack {
  pub id:          String,
  pub name:        String,
  pub duration_ms: u64,
  pub album:       AlbumRef,
  pub artists:     Vec<ArtistCredit>,
}

/// One playback of one track at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
  pub track:     PlayedTrack,
  pub played_at: DateTime<Utc>,
  /// Provider playback context URI (playlist, album, …), when reported.
  pub context:   Option<String>,
}
