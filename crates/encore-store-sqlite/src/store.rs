//! [`SqliteStore`] — the SQLite implementation of [`CollectibleStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use encore_core::{
  artist::ArtistRecord,
  collectible::{CollectibleKind, CollectibleRecord, NewCollectible},
  key::{PROVIDER_SPOTIFY, RecordKey},
  play::{AlbumRef, PlayedTrack},
  profile::UserProfile,
  store::{CollectibleStore, LibraryRowKind},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{CollectiblePayload, RawCollectible, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Encore achievement store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Upsert into `user_records`, preserving `created` and bumping
  /// `updated` on conflict.
  async fn upsert_user_row(&self, pk: String, sk: String, payload: String) -> Result<()> {
    let now_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_records (pk, sk, created, updated, payload)
           VALUES (?1, ?2, ?3, ?3, ?4)
           ON CONFLICT (pk, sk) DO UPDATE
             SET updated = excluded.updated, payload = excluded.payload",
          rusqlite::params![pk, sk, now_str, payload],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Same upsert against the global artist directory.
  async fn upsert_artist_row(&self, pk: String, sk: String, payload: String) -> Result<()> {
    let now_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO artist_records (pk, sk, created, updated, payload)
           VALUES (?1, ?2, ?3, ?3, ?4)
           ON CONFLICT (pk, sk) DO UPDATE
             SET updated = excluded.updated, payload = excluded.payload",
          rusqlite::params![pk, sk, now_str, payload],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn library_prefix(row_kind: LibraryRowKind) -> String {
  let head = match row_kind {
    LibraryRowKind::Artist => "Artist",
    LibraryRowKind::Album => "Album",
    LibraryRowKind::Track => "Track",
  };
  format!("{head}|{PROVIDER_SPOTIFY}|")
}

// ─── CollectibleStore impl ───────────────────────────────────────────────────

impl CollectibleStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
    let pk = user_id.to_owned();
    let sk = RecordKey::auth(user_id)?.encode();

    let payload: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT payload FROM user_records WHERE pk = ?1 AND sk = ?2",
              rusqlite::params![pk, sk],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    payload
      .map(|raw| serde_json::from_str(&raw).map_err(Error::Json))
      .transpose()
  }

  async fn put_profile(&self, profile: &UserProfile) -> Result<()> {
    let sk = RecordKey::auth(&profile.user_id)?.encode();
    let payload = serde_json::to_string(profile)?;
    self.upsert_user_row(profile.user_id.clone(), sk, payload).await
  }

  // ── Collectibles ──────────────────────────────────────────────────────────

  async fn get_collectible(
    &self,
    user_id: &str,
    kind: CollectibleKind,
    artist_id: &str,
  ) -> Result<Option<CollectibleRecord>> {
    let pk = user_id.to_owned();
    let sk = RecordKey::collectible(PROVIDER_SPOTIFY, kind, artist_id)?.encode();

    let raw: Option<RawCollectible> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT pk, sk, created, updated, streamed_ms, status, payload
               FROM user_records WHERE pk = ?1 AND sk = ?2",
              rusqlite::params![pk, sk],
              |row| {
                Ok(RawCollectible {
                  pk:          row.get(0)?,
                  sk:          row.get(1)?,
                  created:     row.get(2)?,
                  updated:     row.get(3)?,
                  streamed_ms: row.get(4)?,
                  status:      row.get(5)?,
                  payload:     row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCollectible::into_record).transpose()
  }

  async fn create_collectible(
    &self,
    input: NewCollectible,
  ) -> Result<Option<CollectibleRecord>> {
    let now = Utc::now();
    let record = CollectibleRecord {
      user_id:     input.user_id,
      kind:        input.kind,
      streamed_ms: input.streamed_ms,
      status:      input.status,
      created:     now,
      updated:     now,
      artist:      input.artist,
      user:        input.user,
      track:       input.track,
    };

    let sk =
      RecordKey::collectible(PROVIDER_SPOTIFY, record.kind, &record.artist.id)?.encode();
    let payload = serde_json::to_string(&CollectiblePayload {
      artist: record.artist.clone(),
      user:   record.user.clone(),
      track:  record.track.clone(),
    })?;

    let pk = record.user_id.clone();
    let now_str = encode_dt(now);
    let streamed_ms = record.streamed_ms as i64;
    let status = record.status.map(|s| s.as_str().to_owned());

    // Conditional create: an existing row is left untouched and reported
    // back as `None`, which is what makes milestone creation idempotent.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO user_records (pk, sk, created, updated, streamed_ms, status, payload)
           VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6)
           ON CONFLICT (pk, sk) DO NOTHING",
          rusqlite::params![pk, sk, now_str, streamed_ms, status, payload],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted.then_some(record))
  }

  async fn update_streamed_ms(
    &self,
    user_id: &str,
    artist_id: &str,
    streamed_ms: u64,
  ) -> Result<()> {
    let pk = user_id.to_owned();
    let sk = RecordKey::collectible(
      PROVIDER_SPOTIFY,
      CollectibleKind::StreamedMilliseconds,
      artist_id,
    )?
    .encode();
    let sk_for_err = sk.clone();
    let now_str = encode_dt(Utc::now());
    let ms = streamed_ms as i64;

    let n: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE user_records SET streamed_ms = ?1, updated = ?2
           WHERE pk = ?3 AND sk = ?4",
          rusqlite::params![ms, now_str, pk, sk],
        )?)
      })
      .await?;

    if n == 0 {
      return Err(Error::CollectibleNotFound(sk_for_err));
    }
    Ok(())
  }

  async fn collectibles_updated_since(
    &self,
    user_id: &str,
    kind: Option<CollectibleKind>,
    since: DateTime<Utc>,
  ) -> Result<Vec<CollectibleRecord>> {
    let pk = user_id.to_owned();
    let prefix = match kind {
      Some(k) => RecordKey::collectible_kind_prefix(PROVIDER_SPOTIFY, k),
      None => RecordKey::collectible_prefix(PROVIDER_SPOTIFY),
    };
    let pattern = format!("{prefix}%");
    let since_str = encode_dt(since);

    let raws: Vec<RawCollectible> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT pk, sk, created, updated, streamed_ms, status, payload
           FROM user_records
           WHERE pk = ?1 AND sk LIKE ?2 AND updated > ?3
           ORDER BY sk",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pk, pattern, since_str], |row| {
            Ok(RawCollectible {
              pk:          row.get(0)?,
              sk:          row.get(1)?,
              created:     row.get(2)?,
              updated:     row.get(3)?,
              streamed_ms: row.get(4)?,
              status:      row.get(5)?,
              payload:     row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCollectible::into_record).collect()
  }

  // ── Library side records ──────────────────────────────────────────────────

  async fn upsert_library_artist(&self, user_id: &str, artist: &ArtistRecord) -> Result<()> {
    let sk = RecordKey::artist(PROVIDER_SPOTIFY, &artist.id)?.encode();
    let payload = serde_json::to_string(artist)?;
    self.upsert_user_row(user_id.to_owned(), sk, payload).await
  }

  async fn upsert_library_album(&self, user_id: &str, album: &AlbumRef) -> Result<()> {
    let sk = RecordKey::album(PROVIDER_SPOTIFY, &album.id)?.encode();
    let payload = serde_json::to_string(album)?;
    self.upsert_user_row(user_id.to_owned(), sk, payload).await
  }

  async fn upsert_library_track(&self, user_id: &str, track: &PlayedTrack) -> Result<()> {
    let sk = RecordKey::track(PROVIDER_SPOTIFY, &track.id)?.encode();
    let payload = serde_json::to_string(track)?;
    self.upsert_user_row(user_id.to_owned(), sk, payload).await
  }

  async fn upsert_directory_artist(&self, artist: &ArtistRecord) -> Result<()> {
    let sk = RecordKey::artist(PROVIDER_SPOTIFY, &artist.id)?.encode();
    let payload = serde_json::to_string(artist)?;
    self.upsert_artist_row(artist.id.clone(), sk, payload).await
  }

  async fn upsert_directory_collectible(
    &self,
    artist: &ArtistRecord,
    kind: CollectibleKind,
  ) -> Result<()> {
    let sk = RecordKey::collectible(PROVIDER_SPOTIFY, kind, &artist.id)?.encode();
    let payload = serde_json::to_string(&serde_json::json!({
      "achievement": kind.discriminant(),
      "artist": artist,
    }))?;
    self.upsert_artist_row(artist.id.clone(), sk, payload).await
  }

  async fn count_library_rows_updated_since(
    &self,
    user_id: &str,
    row_kind: LibraryRowKind,
    since: DateTime<Utc>,
  ) -> Result<u64> {
    let pk = user_id.to_owned();
    let pattern = format!("{}%", library_prefix(row_kind));
    let since_str = encode_dt(since);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM user_records
           WHERE pk = ?1 AND sk LIKE ?2 AND updated > ?3",
          rusqlite::params![pk, pattern, since_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }
}
