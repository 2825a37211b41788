//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (lexicographic order
//! matches instant order for the window comparisons the queries do).
//! Snapshots are stored as compact JSON in the `payload` column.

use chrono::{DateTime, Utc};
use encore_core::{
  collectible::{CollectibleRecord, MintStatus, TrackSnapshot},
  key::RecordKey,
  profile::UserSnapshot,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Collectible payload ─────────────────────────────────────────────────────

/// The denormalized snapshots on a collectible row, stored as one JSON
/// blob. The typed columns (`streamed_ms`, `status`) live outside it.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectiblePayload {
  pub artist: encore_core::artist::ArtistRecord,
  pub user:   UserSnapshot,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub track:  Option<TrackSnapshot>,
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `user_records` collectible row.
pub struct RawCollectible {
  pub pk:          String,
  pub sk:          String,
  pub created:     String,
  pub updated:     String,
  pub streamed_ms: Option<i64>,
  pub status:      Option<String>,
  pub payload:     String,
}

impl RawCollectible {
  pub fn into_record(self) -> Result<CollectibleRecord> {
    let kind = match RecordKey::parse(&self.sk)? {
      RecordKey::Collectible { kind, .. } => kind,
      _ => {
        return Err(Error::Core(encore_core::Error::MalformedKey(self.sk)));
      }
    };

    let payload: CollectiblePayload = serde_json::from_str(&self.payload)?;
    let status = self
      .status
      .as_deref()
      .map(MintStatus::from_str)
      .transpose()?;

    Ok(CollectibleRecord {
      user_id: self.pk,
      kind,
      streamed_ms: self.streamed_ms.unwrap_or(0) as u64,
      status,
      created: decode_dt(&self.created)?,
      updated: decode_dt(&self.updated)?,
      artist: payload.artist,
      user: payload.user,
      track: payload.track,
    })
  }
}
