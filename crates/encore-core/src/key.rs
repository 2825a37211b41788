//! Typed record keys.
//!
//! The store addresses every row by `(partition, sort_key)` where the
//! sort key is a pipe-joined composite of the form
//! `<Kind>|<provider>|<qualifier>|<id>`. Keys are built through the
//! validating constructors here and serialized with [`RecordKey::encode`];
//! ad-hoc string concatenation is what this module exists to replace.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, collectible::CollectibleKind};

/// The only streaming provider currently wired up.
pub const PROVIDER_SPOTIFY: &str = "spotify";

// ─── Key type ────────────────────────────────────────────────────────────────

/// A validated, typed sort key. Construct through the `auth`,
/// `collectible`, `artist`, `album`, and `track` constructors — they
/// reject empty segments and segments containing the separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKey {
  /// The user's profile row.
  Auth { user_id: String },
  /// An achievement record for one (user, artist) pair.
  Collectible {
    provider:  String,
    kind:      CollectibleKind,
    artist_id: String,
  },
  /// Per-user library artist row, or the global artist-directory row.
  Artist { provider: String, id: String },
  Album { provider: String, id: String },
  Track { provider: String, id: String },
}

fn segment(name: &'static str, value: &str) -> Result<()> {
  if value.is_empty() {
    return Err(Error::EmptyKeySegment(name));
  }
  if value.contains('|') {
    return Err(Error::KeySegmentSeparator(name, value.to_owned()));
  }
  Ok(())
}

impl RecordKey {
  pub fn auth(user_id: impl Into<String>) -> Result<Self> {
    let user_id = user_id.into();
    segment("user_id", &user_id)?;
    Ok(Self::Auth { user_id })
  }

  pub fn collectible(
    provider: impl Into<String>,
    kind: CollectibleKind,
    artist_id: impl Into<String>,
  ) -> Result<Self> {
    let provider = provider.into();
    let artist_id = artist_id.into();
    segment("provider", &provider)?;
    segment("artist_id", &artist_id)?;
    Ok(Self::Collectible { provider, kind, artist_id })
  }

  pub fn artist(provider: impl Into<String>, id: impl Into<String>) -> Result<Self> {
    let provider = provider.into();
    let id = id.into();
    segment("provider", &provider)?;
    segment("id", &id)?;
    Ok(Self::Artist { provider, id })
  }

  pub fn album(provider: impl Into<String>, id: impl Into<String>) -> Result<Self> {
    let provider = provider.into();
    let id = id.into();
    segment("provider", &provider)?;
    segment("id", &id)?;
    Ok(Self::Album { provider, id })
  }

  pub fn track(provider: impl Into<String>, id: impl Into<String>) -> Result<Self> {
    let provider = provider.into();
    let id = id.into();
    segment("provider", &provider)?;
    segment("id", &id)?;
    Ok(Self::Track { provider, id })
  }

  // ── Serialization ─────────────────────────────────────────────────────

  /// The wire form stored in the sort-key column.
  pub fn encode(&self) -> String {
    match self {
      Self::Auth { user_id } => format!("Auth|{user_id}"),
      Self::Collectible { provider, kind, artist_id } => {
        format!("Collectible|{provider}|{}|{artist_id}", kind.discriminant())
      }
      Self::Artist { provider, id } => format!("Artist|{provider}|{id}"),
      Self::Album { provider, id } => format!("Album|{provider}|{id}"),
      Self::Track { provider, id } => format!("Track|{provider}|{id}"),
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    let malformed = || Error::MalformedKey(s.to_owned());
    let mut parts = s.split('|');
    let head = parts.next().ok_or_else(malformed)?;
    let rest: Vec<&str> = parts.collect();

    match (head, rest.as_slice()) {
      ("Auth", [user_id]) => Self::auth(*user_id),
      ("Collectible", [provider, kind, artist_id]) => Self::collectible(
        *provider,
        CollectibleKind::from_discriminant(kind)?,
        *artist_id,
      ),
      ("Artist", [provider, id]) => Self::artist(*provider, *id),
      ("Album", [provider, id]) => Self::album(*provider, *id),
      ("Track", [provider, id]) => Self::track(*provider, *id),
      _ => Err(malformed()),
    }
  }

  // ── Range prefixes ────────────────────────────────────────────────────

  /// Prefix matching every collectible for a provider, any kind.
  pub fn collectible_prefix(provider: &str) -> String {
    format!("Collectible|{provider}|")
  }

  /// Prefix matching every collectible of one kind for a provider.
  pub fn collectible_kind_prefix(provider: &str, kind: CollectibleKind) -> String {
    format!("Collectible|{provider}|{}|", kind.discriminant())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collectible_key_round_trip() {
    let key = RecordKey::collectible(
      PROVIDER_SPOTIFY,
      CollectibleKind::Streamed05Hours,
      "4gzpq5DPGxSnKTe4SA8HAU",
    )
    .unwrap();
    let encoded = key.encode();
    assert_eq!(encoded, "Collectible|spotify|streamed05Hours|4gzpq5DPGxSnKTe4SA8HAU");
    assert_eq!(RecordKey::parse(&encoded).unwrap(), key);
  }

  #[test]
  fn auth_and_library_keys_round_trip() {
    for key in [
      RecordKey::auth("user-1").unwrap(),
      RecordKey::artist(PROVIDER_SPOTIFY, "a1").unwrap(),
      RecordKey::album(PROVIDER_SPOTIFY, "b2").unwrap(),
      RecordKey::track(PROVIDER_SPOTIFY, "c3").unwrap(),
    ] {
      assert_eq!(RecordKey::parse(&key.encode()).unwrap(), key);
    }
  }

  #[test]
  fn constructors_reject_bad_segments() {
    assert!(matches!(
      RecordKey::auth(""),
      Err(Error::EmptyKeySegment("user_id"))
    ));
    assert!(matches!(
      RecordKey::artist(PROVIDER_SPOTIFY, "a|b"),
      Err(Error::KeySegmentSeparator("id", _))
    ));
  }

  #[test]
  fn parse_rejects_malformed_keys() {
    for bad in ["", "Collectible|spotify", "Nope|spotify|x", "Auth|a|b"] {
      assert!(RecordKey::parse(bad).is_err(), "accepted {bad:?}");
    }
    assert!(matches!(
      RecordKey::parse("Collectible|spotify|streamed99Hours|a1"),
      Err(Error::UnknownCollectibleKind(_))
    ));
  }

  #[test]
  fn kind_prefix_matches_encoded_key() {
    let key = RecordKey::collectible(
      PROVIDER_SPOTIFY,
      CollectibleKind::StreamedMilliseconds,
      "a1",
    )
    .unwrap();
    let prefix =
      RecordKey::collectible_kind_prefix(PROVIDER_SPOTIFY, CollectibleKind::StreamedMilliseconds);
    assert!(key.encode().starts_with(&prefix));
  }
}
