//! Spotify Web API client for the Encore engine.
//!
//! Implements [`ListeningSource`] over reqwest. Access-token refresh is a
//! setup-phase operation on [`SpotifyClient`]; the authorized
//! [`SpotifySession`] it produces is what the coordinator sees.
//!
//! Every provider failure is reported as a typed [`SourceError`] value:
//! a 401 maps to `Unauthorized`, everything else (5xx, network, malformed
//! payload) to `Transient`.

mod wire;

use std::time::Duration;

use encore_core::{
  artist::ArtistRecord,
  play::{AlbumRef, PlayEvent},
  source::{ListeningSource, SourceError},
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

const API_BASE_URL: &str = "https://api.spotify.com";
const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

fn transport(e: reqwest::Error) -> SourceError {
  SourceError::Transient(e.to_string())
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Application credentials for the provider's OAuth token endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub client_id:     String,
  pub client_secret: String,
}

/// Unauthorized client — can only exchange refresh tokens.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SpotifyClient {
  http:          Client,
  api_base:      String,
  accounts_base: String,
}

impl SpotifyClient {
  pub fn new() -> Result<Self, SourceError> {
    let http = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| SourceError::Transient(format!("failed to build HTTP client: {e}")))?;
    Ok(Self {
      http,
      api_base: API_BASE_URL.to_owned(),
      accounts_base: ACCOUNTS_BASE_URL.to_owned(),
    })
  }

  /// Point the client at different base URLs (local stubs in tests).
  pub fn with_base_urls(
    mut self,
    api_base: impl Into<String>,
    accounts_base: impl Into<String>,
  ) -> Self {
    self.api_base = api_base.into();
    self.accounts_base = accounts_base.into();
    self
  }

  /// Exchange a long-lived refresh token for a short-lived access token.
  ///
  /// The token endpoint answers 400 (`invalid_grant`) for a revoked or
  /// expired refresh token, so both 400 and 401 surface as
  /// [`SourceError::Unauthorized`].
  pub async fn refresh_access_token(
    &self,
    creds: &Credentials,
    refresh_token: &str,
  ) -> Result<String, SourceError> {
    let resp = self
      .http
      .post(format!("{}/api/token", self.accounts_base))
      .basic_auth(&creds.client_id, Some(&creds.client_secret))
      .form(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
      ])
      .send()
      .await
      .map_err(transport)?;

    match resp.status() {
      StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => Err(SourceError::Unauthorized),
      s if s.is_success() => {
        let token: wire::TokenResponse = resp
          .json()
          .await
          .map_err(|e| SourceError::Transient(format!("malformed token response: {e}")))?;
        Ok(token.access_token)
      }
      s => Err(SourceError::Transient(format!("token endpoint answered {s}"))),
    }
  }

  /// Wrap an access token into an authorized session.
  pub fn session(&self, access_token: impl Into<String>) -> SpotifySession {
    SpotifySession {
      http:         self.http.clone(),
      api_base:     self.api_base.clone(),
      access_token: access_token.into(),
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// An authorized session against the provider API.
#[derive(Clone)]
pub struct SpotifySession {
  http:         Client,
  api_base:     String,
  access_token: String,
}

impl SpotifySession {
  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
    let resp = self
      .http
      .get(format!("{}{path}", self.api_base))
      .bearer_auth(&self.access_token)
      .send()
      .await
      .map_err(transport)?;

    match resp.status() {
      StatusCode::UNAUTHORIZED => Err(SourceError::Unauthorized),
      s if s.is_success() => resp
        .json()
        .await
        .map_err(|e| SourceError::Transient(format!("malformed response for {path}: {e}"))),
      s => Err(SourceError::Transient(format!("{path} answered {s}"))),
    }
  }
}

impl ListeningSource for SpotifySession {
  async fn recently_played(&self, limit: usize) -> Result<Vec<PlayEvent>, SourceError> {
    let page: wire::RecentlyPlayed = self
      .get_json(&format!("/v1/me/player/recently-played?limit={limit}"))
      .await?;
    page.items.into_iter().map(wire::PlayedItem::into_event).collect()
  }

  async fn artist(&self, id: &str) -> Result<ArtistRecord, SourceError> {
    let artist: wire::Artist = self.get_json(&format!("/v1/artists/{id}")).await?;
    Ok(artist.into_record())
  }

  async fn new_releases(&self, limit: usize) -> Result<Vec<AlbumRef>, SourceError> {
    let page: wire::NewReleases = self
      .get_json(&format!("/v1/browse/new-releases?limit={limit}"))
      .await?;
    Ok(page.albums.items.into_iter().map(wire::Album::into_ref).collect())
  }
}
