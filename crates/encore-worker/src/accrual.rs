//! The accrual coordinator.
//!
//! Turns a batch of play events for one user into achievement-store
//! writes and reports which users newly earned a milestone. All per-item
//! failures (a flaky artist lookup, one failed write) are logged and
//! skipped; the batch always runs to completion. That is safe because
//! every store write is independently idempotent: milestone creation is
//! conditional and accumulator updates are last-write-wins per key.

use chrono::{DateTime, Duration, Utc};
use encore_core::{
  collectible::{CollectibleKind, NewCollectible, TrackSnapshot},
  play::PlayEvent,
  profile::UserProfile,
  source::ListeningSource,
  store::CollectibleStore,
  tiers,
};
use tracing::{debug, info, warn};

use crate::pacing::WritePacer;

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Which play events in a batch are eligible for accrual.
///
/// The two run modes use different windows and write different side
/// records; they are kept as distinct named policies rather than merged,
/// since the divergence in the upstream jobs is unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
  /// Only events played within the trailing 24 hours. Also refreshes the
  /// user's album and track library rows. Used by the daily scheduled
  /// check.
  RecentDay,
  /// Every returned event, unfiltered. Also refreshes the directory-side
  /// collectible marker. Used by the integration-change check.
  AllReturned,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// What a batch actually did.
#[derive(Debug, Default)]
pub struct RunSummary {
  /// Store mutations applied.
  pub writes:  u64,
  /// Items abandoned after a lookup or write failure.
  pub skipped: u64,
  /// Users who newly reached `ReadyToMint` on at least one milestone
  /// this run, deduplicated. Drives the notification decision.
  pub ready_to_mint: Vec<String>,
}

impl RunSummary {
  fn note_ready(&mut self, user_id: &str) {
    if !self.ready_to_mint.iter().any(|u| u == user_id) {
      self.ready_to_mint.push(user_id.to_owned());
    }
  }
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

/// Orchestrates one user's playback window against the store. All
/// collaborators are injected so tests can substitute fakes.
pub struct Coordinator<'a, S, L> {
  store:  &'a S,
  source: &'a L,
  pacer:  &'a WritePacer,
}

impl<'a, S, L> Coordinator<'a, S, L>
where
  S: CollectibleStore,
  L: ListeningSource,
{
  pub fn new(store: &'a S, source: &'a L, pacer: &'a WritePacer) -> Self {
    Self { store, source, pacer }
  }

  /// Process one batch of play events for `user` under `policy`.
  ///
  /// `now` anchors both the eligibility window and the release-window
  /// check; callers pass the wall clock, tests pass a fixed instant.
  pub async fn process_playback_window(
    &self,
    user: &UserProfile,
    events: &[PlayEvent],
    policy: WindowPolicy,
    now: DateTime<Utc>,
  ) -> RunSummary {
    let mut summary = RunSummary::default();
    let cutoff = now - Duration::hours(24);

    let eligible: Vec<&PlayEvent> = events
      .iter()
      .filter(|e| policy == WindowPolicy::AllReturned || e.played_at > cutoff)
      .collect();
    debug!(
      user = %user.user_id,
      total = events.len(),
      eligible = eligible.len(),
      "processing playback window"
    );

    for event in eligible {
      if policy == WindowPolicy::RecentDay {
        self.write_library_rows(user, event, &mut summary).await;
      }

      for credit in &event.track.artists {
        self
          .accrue_for_artist(user, event, &credit.id, policy, &mut summary)
          .await;
      }

      // Independent of accrual and of the windowing policy.
      self.check_release_window(user, event, now, &mut summary).await;
    }

    summary
  }

  // ── Side records ──────────────────────────────────────────────────────────

  async fn write_library_rows(
    &self,
    user: &UserProfile,
    event: &PlayEvent,
    summary: &mut RunSummary,
  ) {
    self.pacer.pace().await;
    record_write(
      self.store.upsert_library_album(&user.user_id, &event.track.album).await,
      "library album",
      summary,
    );
    self.pacer.pace().await;
    record_write(
      self.store.upsert_library_track(&user.user_id, &event.track).await,
      "library track",
      summary,
    );
  }

  // ── Accrual ───────────────────────────────────────────────────────────────

  async fn accrue_for_artist(
    &self,
    user: &UserProfile,
    event: &PlayEvent,
    artist_id: &str,
    policy: WindowPolicy,
    summary: &mut RunSummary,
  ) {
    let artist = match self.source.artist(artist_id).await {
      Ok(a) => a,
      Err(e) => {
        warn!(artist = artist_id, error = %e, "artist lookup failed; skipping");
        summary.skipped += 1;
        return;
      }
    };

    self.pacer.pace().await;
    record_write(
      self.store.upsert_library_artist(&user.user_id, &artist).await,
      "library artist",
      summary,
    );
    self.pacer.pace().await;
    record_write(
      self.store.upsert_directory_artist(&artist).await,
      "directory artist",
      summary,
    );
    if policy == WindowPolicy::AllReturned {
      self.pacer.pace().await;
      record_write(
        self
          .store
          .upsert_directory_collectible(&artist, CollectibleKind::StreamedMilliseconds)
          .await,
        "directory collectible",
        summary,
      );
    }

    let previous = match self
      .store
      .get_collectible(&user.user_id, CollectibleKind::StreamedMilliseconds, &artist.id)
      .await
    {
      Ok(p) => p,
      Err(e) => {
        warn!(artist = %artist.id, error = %e, "accumulator read failed; skipping");
        summary.skipped += 1;
        return;
      }
    };

    match previous {
      None => {
        // First play for this (user, artist): create the accumulator
        // with the raw event duration. Tier evaluation is skipped on
        // this write — see DESIGN.md, candidate upstream bug preserved
        // as observed.
        self.pacer.pace().await;
        let input = NewCollectible::accumulator(
          &user.user_id,
          artist,
          user.snapshot(),
          event.track.duration_ms,
        );
        match self.store.create_collectible(input).await {
          Ok(_) => summary.writes += 1,
          Err(e) => {
            warn!(error = %e, "accumulator create failed; skipping");
            summary.skipped += 1;
          }
        }
      }
      Some(prev) => {
        let new_ms = prev.streamed_ms + event.track.duration_ms;
        debug!(
          artist = %artist.id,
          previous = prev.streamed_ms,
          new = new_ms,
          "incrementing streamed milliseconds"
        );

        self.pacer.pace().await;
        if let Err(e) = self
          .store
          .update_streamed_ms(&user.user_id, &artist.id, new_ms)
          .await
        {
          warn!(artist = %artist.id, error = %e, "accumulator update failed; skipping");
          summary.skipped += 1;
          return;
        }
        summary.writes += 1;

        for kind in tiers::tiers_crossed(prev.streamed_ms, new_ms) {
          self.pacer.pace().await;
          let input = NewCollectible::milestone(
            &user.user_id,
            kind,
            artist.clone(),
            user.snapshot(),
            new_ms,
          );
          match self.store.create_collectible(input).await {
            Ok(Some(_)) => {
              info!(
                user = %user.user_id,
                artist = %artist.id,
                milestone = kind.discriminant(),
                "milestone unlocked"
              );
              summary.writes += 1;
              summary.note_ready(&user.user_id);
            }
            // Already earned in an earlier run; replays are no-ops.
            Ok(None) => {}
            Err(e) => {
              warn!(milestone = kind.discriminant(), error = %e, "milestone create failed; skipping");
              summary.skipped += 1;
            }
          }
        }
      }
    }
  }

  // ── Release window ────────────────────────────────────────────────────────

  /// One-shot marker for listening to an album within 24 hours of its
  /// release. Evaluated per event; creation is conditional, so replays
  /// neither duplicate the record nor re-notify.
  async fn check_release_window(
    &self,
    user: &UserProfile,
    event: &PlayEvent,
    now: DateTime<Utc>,
    summary: &mut RunSummary,
  ) {
    let Some(released_at) = event.track.album.released_at() else {
      return;
    };
    let age = now - released_at;
    if age <= Duration::zero() || age >= Duration::hours(24) {
      return;
    }

    // Credit goes to the first (primary) artist on the track.
    let Some(credit) = event.track.artists.first() else {
      return;
    };
    let artist = match self.source.artist(&credit.id).await {
      Ok(a) => a,
      Err(e) => {
        warn!(artist = %credit.id, error = %e, "artist lookup failed; skipping release marker");
        summary.skipped += 1;
        return;
      }
    };

    let mut input = NewCollectible::milestone(
      &user.user_id,
      CollectibleKind::StreamedTrackInFirst24Hours,
      artist,
      user.snapshot(),
      0,
    );
    input.track = Some(TrackSnapshot {
      id:         event.track.id.clone(),
      name:       event.track.name.clone(),
      album_id:   event.track.album.id.clone(),
      album_name: event.track.album.name.clone(),
      played_at:  event.played_at,
      context:    event.context.clone(),
    });

    self.pacer.pace().await;
    match self.store.create_collectible(input).await {
      Ok(Some(_)) => {
        info!(
          user = %user.user_id,
          track = %event.track.name,
          "listened within 24 hours of release"
        );
        summary.writes += 1;
        summary.note_ready(&user.user_id);
      }
      Ok(None) => {}
      Err(e) => {
        warn!(error = %e, "release marker create failed; skipping");
        summary.skipped += 1;
      }
    }
  }
}

fn record_write<E: std::fmt::Display>(
  result: Result<(), E>,
  what: &'static str,
  summary: &mut RunSummary,
) {
  match result {
    Ok(()) => summary.writes += 1,
    Err(e) => {
      warn!(item = what, error = %e, "store write failed; skipping");
      summary.skipped += 1;
    }
  }
}
