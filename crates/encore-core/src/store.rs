//! The `CollectibleStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `encore-store-sqlite`). The coordinator and the weekly summarizer
//! depend on this abstraction, not on any concrete backend, so tests can
//! substitute an in-memory store.
//!
//! All writes are independently idempotent per key: milestone creation is
//! conditional (an existing row makes it a no-op) and accumulator updates
//! are last-write-wins. That is what makes partial-failure-and-retry of a
//! whole batch safe without any locking.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  artist::ArtistRecord,
  collectible::{CollectibleKind, CollectibleRecord, NewCollectible},
  play::{AlbumRef, PlayedTrack},
  profile::UserProfile,
};

/// Which per-user library side-table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryRowKind {
  Artist,
  Album,
  Track,
}

/// Abstraction over the achievement store backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait CollectibleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Fetch the `Auth|<user_id>` profile row. `None` if the user is not
  /// registered.
  fn get_profile<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + 'a;

  /// Upsert a profile row. Account provisioning and tests use this; the
  /// accrual engine never does.
  fn put_profile<'a>(
    &'a self,
    profile: &'a UserProfile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Collectibles ──────────────────────────────────────────────────────

  /// Point lookup by `(user_id, kind, artist_id)`.
  fn get_collectible<'a>(
    &'a self,
    user_id: &'a str,
    kind: CollectibleKind,
    artist_id: &'a str,
  ) -> impl Future<Output = Result<Option<CollectibleRecord>, Self::Error>> + Send + 'a;

  /// Conditionally create a collectible. Returns the persisted record
  /// with store-assigned timestamps, or `None` if a record with the same
  /// identity already exists (idempotent no-op).
  fn create_collectible(
    &self,
    input: NewCollectible,
  ) -> impl Future<Output = Result<Option<CollectibleRecord>, Self::Error>> + Send + '_;

  /// Partial update of the accumulator: set `streamed_ms` and bump
  /// `updated`, leaving every other field untouched. Fails if the record
  /// does not exist.
  fn update_streamed_ms<'a>(
    &'a self,
    user_id: &'a str,
    artist_id: &'a str,
    streamed_ms: u64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Collectibles for a user whose `updated` falls after `since`,
  /// optionally restricted to one kind. Used by the weekly summarizer.
  fn collectibles_updated_since<'a>(
    &'a self,
    user_id: &'a str,
    kind: Option<CollectibleKind>,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<CollectibleRecord>, Self::Error>> + Send + 'a;

  // ── Library side records ──────────────────────────────────────────────
  //
  // Denormalized rows for the user's listening library and the global
  // artist directory. Not part of the accrual invariant; upserts preserve
  // `created` and bump `updated`.

  fn upsert_library_artist<'a>(
    &'a self,
    user_id: &'a str,
    artist: &'a ArtistRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn upsert_library_album<'a>(
    &'a self,
    user_id: &'a str,
    album: &'a AlbumRef,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn upsert_library_track<'a>(
    &'a self,
    user_id: &'a str,
    track: &'a PlayedTrack,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Global artist-directory row, keyed by the artist itself.
  fn upsert_directory_artist<'a>(
    &'a self,
    artist: &'a ArtistRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Directory-side collectible marker for an artist.
  fn upsert_directory_collectible<'a>(
    &'a self,
    artist: &'a ArtistRecord,
    kind: CollectibleKind,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Count of a user's library rows of one kind whose `updated` falls
  /// after `since`.
  fn count_library_rows_updated_since<'a>(
    &'a self,
    user_id: &'a str,
    row_kind: LibraryRowKind,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}
