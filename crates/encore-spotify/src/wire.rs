//! Wire-format types for the provider's JSON payloads and their
//! conversions into the domain model.

use chrono::{DateTime, NaiveDate, Utc};
use encore_core::{
  artist::{ArtistRecord, ImageRef},
  play::{AlbumRef, ArtistCredit, PlayEvent, PlayedTrack},
  source::SourceError,
};
use serde::Deserialize;

// ─── Token endpoint ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
}

// ─── Shared fragments ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Image {
  pub url:    String,
  pub width:  Option<u32>,
  pub height: Option<u32>,
}

impl Image {
  fn into_ref(self) -> ImageRef {
    ImageRef { url: self.url, width: self.width, height: self.height }
  }
}

#[derive(Debug, Deserialize)]
pub struct ArtistStub {
  pub id:   String,
  pub name: String,
}

impl ArtistStub {
  fn into_credit(self) -> ArtistCredit {
    ArtistCredit { id: self.id, name: self.name }
  }
}

// ─── Albums ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Album {
  pub id:   String,
  pub name: String,
  pub release_date: Option<String>,
  pub release_date_precision: Option<String>,
  #[serde(default)]
  pub images: Vec<Image>,
  #[serde(default)]
  pub artists: Vec<ArtistStub>,
}

impl Album {
  pub fn into_ref(self) -> AlbumRef {
    let release_date = self
      .release_date
      .as_deref()
      .and_then(|raw| parse_release_date(raw, self.release_date_precision.as_deref()));
    AlbumRef {
      id: self.id,
      name: self.name,
      release_date,
      images: self.images.into_iter().map(Image::into_ref).collect(),
      artists: self.artists.into_iter().map(ArtistStub::into_credit).collect(),
    }
  }
}

/// The provider reports release dates at day, month, or year precision.
/// Coarser precisions round down to the first day.
pub fn parse_release_date(raw: &str, precision: Option<&str>) -> Option<NaiveDate> {
  let normalized = match precision {
    Some("day") => raw.to_owned(),
    Some("month") => format!("{raw}-01"),
    Some("year") => format!("{raw}-01-01"),
    // No (or unknown) precision: infer from the string shape.
    _ => match raw.len() {
      4 => format!("{raw}-01-01"),
      7 => format!("{raw}-01"),
      _ => raw.to_owned(),
    },
  };
  NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}

// ─── Recently played ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecentlyPlayed {
  pub items: Vec<PlayedItem>,
}

#[derive(Debug, Deserialize)]
pub struct Context {
  pub uri: String,
}

#[derive(Debug, Deserialize)]
pub struct Track {
  pub id:          String,
  pub name:        String,
  pub duration_ms: u64,
  pub album:       Album,
  pub artists:     Vec<ArtistStub>,
}

#[derive(Debug, Deserialize)]
pub struct PlayedItem {
  pub track:     Track,
  pub played_at: String,
  pub context:   Option<Context>,
}

impl PlayedItem {
  pub fn into_event(self) -> Result<PlayEvent, SourceError> {
    let played_at: DateTime<Utc> = self
      .played_at
      .parse()
      .map_err(|e| SourceError::Transient(format!("bad played_at {:?}: {e}", self.played_at)))?;

    Ok(PlayEvent {
      track: PlayedTrack {
        id:          self.track.id,
        name:        self.track.name,
        duration_ms: self.track.duration_ms,
        album:       self.track.album.into_ref(),
        artists:     self
          .track
          .artists
          .into_iter()
          .map(ArtistStub::into_credit)
          .collect(),
      },
      played_at,
      context: self.context.map(|c| c.uri),
    })
  }
}

// ─── Artists ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Followers {
  pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct Artist {
  pub id:   String,
  pub name: String,
  #[serde(default)]
  pub genres: Vec<String>,
  #[serde(default)]
  pub images: Vec<Image>,
  pub popularity: Option<u32>,
  pub followers:  Option<Followers>,
}

impl Artist {
  pub fn into_record(self) -> ArtistRecord {
    ArtistRecord {
      id:         self.id,
      name:       self.name,
      genres:     self.genres,
      images:     self.images.into_iter().map(Image::into_ref).collect(),
      popularity: self.popularity,
      followers:  self.followers.map(|f| f.total),
    }
  }
}

// ─── New releases ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AlbumPage {
  pub items: Vec<Album>,
}

#[derive(Debug, Deserialize)]
pub struct NewReleases {
  pub albums: AlbumPage,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recently_played_item_converts_to_event() {
    let raw = r#"{
      "items": [{
        "track": {
          "id": "11dFghVXANMlKmJXsNCbNl",
          "name": "Cut To The Feeling",
          "duration_ms": 207959,
          "album": {
            "id": "0tGPJ0bkWOUmH7MEOR77qc",
            "name": "Cut To The Feeling",
            "release_date": "2017-05-26",
            "release_date_precision": "day",
            "images": [{"url": "https://i.scdn.co/image/ab67616d0000b273", "width": 640, "height": 640}],
            "artists": [{"id": "6sFIWsNpZYqfjUpaCgueju", "name": "Carly Rae Jepsen"}]
          },
          "artists": [{"id": "6sFIWsNpZYqfjUpaCgueju", "name": "Carly Rae Jepsen"}]
        },
        "played_at": "2024-06-15T09:30:21.123Z",
        "context": {"uri": "spotify:playlist:37i9dQZF1DX"}
      }]
    }"#;

    let page: RecentlyPlayed = serde_json::from_str(raw).unwrap();
    let events: Vec<PlayEvent> = page
      .items
      .into_iter()
      .map(|i| i.into_event().unwrap())
      .collect();

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.track.duration_ms, 207_959);
    assert_eq!(event.track.artists[0].id, "6sFIWsNpZYqfjUpaCgueju");
    assert_eq!(
      event.track.album.release_date,
      NaiveDate::from_ymd_opt(2017, 5, 26)
    );
    assert_eq!(event.context.as_deref(), Some("spotify:playlist:37i9dQZF1DX"));
    assert_eq!(event.played_at.timestamp(), 1_718_443_821);
  }

  #[test]
  fn artist_payload_converts_to_record() {
    let raw = r#"{
      "id": "0OdUWJ0sBjDrqHygGUXeCF",
      "name": "Band of Horses",
      "genres": ["indie rock", "folk rock"],
      "images": [{"url": "https://i.scdn.co/image/ab6761610000e5eb", "width": 640, "height": 640}],
      "popularity": 59,
      "followers": {"href": null, "total": 1402776}
    }"#;

    let record = serde_json::from_str::<Artist>(raw).unwrap().into_record();
    assert_eq!(record.name, "Band of Horses");
    assert_eq!(record.followers, Some(1_402_776));
    assert_eq!(record.genres.len(), 2);
  }

  #[test]
  fn release_date_precision_rounds_down() {
    assert_eq!(
      parse_release_date("2024-03-08", Some("day")),
      NaiveDate::from_ymd_opt(2024, 3, 8)
    );
    assert_eq!(
      parse_release_date("2024-03", Some("month")),
      NaiveDate::from_ymd_opt(2024, 3, 1)
    );
    assert_eq!(
      parse_release_date("2024", Some("year")),
      NaiveDate::from_ymd_opt(2024, 1, 1)
    );
    // Precision missing: inferred from shape.
    assert_eq!(
      parse_release_date("1991", None),
      NaiveDate::from_ymd_opt(1991, 1, 1)
    );
    assert_eq!(parse_release_date("not-a-date", None), None);
  }

  #[test]
  fn new_releases_page_flattens_to_album_refs() {
    let raw = r#"{
      "albums": {
        "items": [{
          "id": "5ht7ItJgpBH7W6vJ5BqpPr",
          "name": "Midnights",
          "release_date": "2022-10",
          "release_date_precision": "month",
          "images": [],
          "artists": [{"id": "06HL4z0CvFAxyc27GXpf02", "name": "Taylor Swift"}]
        }]
      }
    }"#;

    let page: NewReleases = serde_json::from_str(raw).unwrap();
    let refs: Vec<AlbumRef> = page.albums.items.into_iter().map(Album::into_ref).collect();
    assert_eq!(refs[0].artists[0].name, "Taylor Swift");
    assert_eq!(refs[0].release_date, NaiveDate::from_ymd_opt(2022, 10, 1));
  }
}
