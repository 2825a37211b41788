//! Artist snapshots — denormalized provider metadata.
//!
//! Artist data is copied into collectible records at write time so
//! notification rendering never needs a live provider call. Snapshots are
//! not authoritative; the provider is.

use serde::{Deserialize, Serialize};

/// A provider-hosted image, usually one of several sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
  pub url:    String,
  pub width:  Option<u32>,
  pub height: Option<u32>,
}

/// Denormalized artist metadata as returned by the streaming provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
  pub id:         String,
  pub name:       String,
  #[serde(default)]
  pub genres:     Vec<String>,
  #[serde(default)]
  pub images:     Vec<ImageRef>,
  pub popularity: Option<u32>,
  pub followers:  Option<u64>,
}

impl ArtistRecord {
  /// Minimal snapshot with only identity fields set; used when the
  /// provider lookup returned a bare artist credit.
  pub fn bare(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id:         id.into(),
      name:       name.into(),
      genres:     Vec::new(),
      images:     Vec::new(),
      popularity: None,
      followers:  None,
    }
  }
}
