//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use encore_core::{
  artist::ArtistRecord,
  collectible::{CollectibleKind, MintStatus, NewCollectible, TrackSnapshot},
  play::{AlbumRef, ArtistCredit, PlayedTrack},
  profile::UserProfile,
  store::{CollectibleStore, LibraryRowKind},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn profile(user_id: &str) -> UserProfile {
  UserProfile {
    user_id:       user_id.into(),
    name:          "Alice".into(),
    email:         "alice@example.com".into(),
    email_opt_in:  None,
    profile_image: Some("https://img.example/alice.png".into()),
    verifier_id:   Some("ver-1".into()),
    addresses:     [("eth".to_string(), "0xabc".to_string())].into(),
  }
}

fn artist(id: &str) -> ArtistRecord {
  ArtistRecord {
    id:         id.into(),
    name:       format!("Artist {id}"),
    genres:     vec!["shoegaze".into()],
    images:     Vec::new(),
    popularity: Some(61),
    followers:  Some(120_000),
  }
}

fn accumulator(user_id: &str, artist_id: &str, ms: u64) -> NewCollectible {
  NewCollectible::accumulator(user_id, artist(artist_id), profile(user_id).snapshot(), ms)
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_get_profile_round_trip() {
  let s = store().await;
  let p = profile("user-1");

  s.put_profile(&p).await.unwrap();
  let fetched = s.get_profile("user-1").await.unwrap();
  assert_eq!(fetched, Some(p));
}

#[tokio::test]
async fn get_profile_missing_returns_none() {
  let s = store().await;
  assert!(s.get_profile("nobody").await.unwrap().is_none());
}

// ─── Collectibles ────────────────────────────────────────────────────────────

#[tokio::test]
async fn accumulator_write_read_round_trip() {
  let s = store().await;

  let created = s
    .create_collectible(accumulator("user-1", "a1", 200_000))
    .await
    .unwrap()
    .expect("fresh create");
  assert_eq!(created.streamed_ms, 200_000);
  assert_eq!(created.status, None);

  let fetched = s
    .get_collectible("user-1", CollectibleKind::StreamedMilliseconds, "a1")
    .await
    .unwrap()
    .expect("row exists");
  assert_eq!(fetched.streamed_ms, 200_000);
  assert_eq!(fetched.artist, created.artist);
  assert_eq!(fetched.user, created.user);
  assert!(!fetched.touched_since_creation());
}

#[tokio::test]
async fn create_collectible_is_conditional() {
  let s = store().await;

  let first = s
    .create_collectible(accumulator("user-1", "a1", 100))
    .await
    .unwrap();
  assert!(first.is_some());

  // A second create with the same identity is an idempotent no-op and
  // must not clobber the stored value.
  let second = s
    .create_collectible(accumulator("user-1", "a1", 999))
    .await
    .unwrap();
  assert!(second.is_none());

  let fetched = s
    .get_collectible("user-1", CollectibleKind::StreamedMilliseconds, "a1")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.streamed_ms, 100);
}

#[tokio::test]
async fn update_streamed_ms_bumps_updated_only() {
  let s = store().await;
  s.create_collectible(accumulator("user-1", "a1", 1_000))
    .await
    .unwrap();

  s.update_streamed_ms("user-1", "a1", 5_000).await.unwrap();

  let fetched = s
    .get_collectible("user-1", CollectibleKind::StreamedMilliseconds, "a1")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.streamed_ms, 5_000);
  assert!(fetched.touched_since_creation());
}

#[tokio::test]
async fn update_missing_accumulator_errors() {
  let s = store().await;
  let err = s.update_streamed_ms("user-1", "ghost", 1).await.unwrap_err();
  assert!(matches!(err, crate::Error::CollectibleNotFound(_)));
}

#[tokio::test]
async fn milestone_with_track_snapshot_round_trips() {
  let s = store().await;
  let mut input = NewCollectible::milestone(
    "user-1",
    CollectibleKind::StreamedTrackInFirst24Hours,
    artist("a1"),
    profile("user-1").snapshot(),
    0,
  );
  input.track = Some(TrackSnapshot {
    id:         "t1".into(),
    name:       "Opening Night".into(),
    album_id:   "b1".into(),
    album_name: "First Light".into(),
    played_at:  Utc::now(),
    context:    Some("spotify:album:b1".into()),
  });

  s.create_collectible(input).await.unwrap().expect("created");

  let fetched = s
    .get_collectible("user-1", CollectibleKind::StreamedTrackInFirst24Hours, "a1")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.status, Some(MintStatus::ReadyToMint));
  assert_eq!(fetched.track.unwrap().name, "Opening Night");
}

// ─── Windowed queries ────────────────────────────────────────────────────────

#[tokio::test]
async fn collectibles_updated_since_filters_kind_and_window() {
  let s = store().await;
  s.create_collectible(accumulator("user-1", "a1", 10)).await.unwrap();
  s.create_collectible(accumulator("user-1", "a2", 20)).await.unwrap();
  s.create_collectible(NewCollectible::milestone(
    "user-1",
    CollectibleKind::Streamed01Hour,
    artist("a1"),
    profile("user-1").snapshot(),
    3_700_000,
  ))
  .await
  .unwrap();
  // Another user's rows never leak in.
  s.create_collectible(accumulator("user-2", "a1", 30)).await.unwrap();

  let recent = s
    .collectibles_updated_since("user-1", None, Utc::now() - Duration::hours(1))
    .await
    .unwrap();
  assert_eq!(recent.len(), 3);

  let accumulators = s
    .collectibles_updated_since(
      "user-1",
      Some(CollectibleKind::StreamedMilliseconds),
      Utc::now() - Duration::hours(1),
    )
    .await
    .unwrap();
  assert_eq!(accumulators.len(), 2);
  assert!(accumulators.iter().all(|c| c.is_accumulator()));

  let future = s
    .collectibles_updated_since("user-1", None, Utc::now() + Duration::hours(1))
    .await
    .unwrap();
  assert!(future.is_empty());
}

// ─── Library side records ────────────────────────────────────────────────────

fn album(id: &str) -> AlbumRef {
  AlbumRef {
    id:           id.into(),
    name:         format!("Album {id}"),
    release_date: None,
    images:       Vec::new(),
    artists:      vec![ArtistCredit { id: "a1".into(), name: "Artist a1".into() }],
  }
}

fn track(id: &str, album_id: &str) -> PlayedTrack {
  PlayedTrack {
    id:          id.into(),
    name:        format!("Track {id}"),
    duration_ms: 180_000,
    album:       album(album_id),
    artists:     vec![ArtistCredit { id: "a1".into(), name: "Artist a1".into() }],
  }
}

#[tokio::test]
async fn library_rows_are_upserted_and_counted() {
  let s = store().await;
  let since = Utc::now() - Duration::hours(1);

  s.upsert_library_artist("user-1", &artist("a1")).await.unwrap();
  s.upsert_library_album("user-1", &album("b1")).await.unwrap();
  s.upsert_library_album("user-1", &album("b2")).await.unwrap();
  s.upsert_library_track("user-1", &track("t1", "b1")).await.unwrap();

  // Replaying the same rows is an upsert, not a duplicate.
  s.upsert_library_album("user-1", &album("b1")).await.unwrap();

  let albums = s
    .count_library_rows_updated_since("user-1", LibraryRowKind::Album, since)
    .await
    .unwrap();
  let tracks = s
    .count_library_rows_updated_since("user-1", LibraryRowKind::Track, since)
    .await
    .unwrap();
  let artists = s
    .count_library_rows_updated_since("user-1", LibraryRowKind::Artist, since)
    .await
    .unwrap();
  assert_eq!((albums, tracks, artists), (2, 1, 1));

  let none = s
    .count_library_rows_updated_since("user-1", LibraryRowKind::Album, Utc::now() + Duration::hours(1))
    .await
    .unwrap();
  assert_eq!(none, 0);
}

#[tokio::test]
async fn directory_rows_accept_replays() {
  let s = store().await;
  let a = artist("a1");

  s.upsert_directory_artist(&a).await.unwrap();
  s.upsert_directory_artist(&a).await.unwrap();
  s.upsert_directory_collectible(&a, CollectibleKind::StreamedMilliseconds)
    .await
    .unwrap();
  s.upsert_directory_collectible(&a, CollectibleKind::StreamedMilliseconds)
    .await
    .unwrap();
}
