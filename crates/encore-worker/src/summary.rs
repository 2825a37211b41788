//! The weekly progress summarizer — a read-only reporting pass.
//!
//! Looks back over the trailing seven days of one user's store activity
//! and produces the payload for the weekly progress email. Performs no
//! writes.

use chrono::{DateTime, Duration, Utc};
use encore_core::{
  collectible::{CollectibleKind, CollectibleRecord},
  notify::{Notification, TemplateField},
  source::ListeningSource,
  store::{CollectibleStore, LibraryRowKind},
  tiers,
};
use rand::seq::SliceRandom as _;
use tracing::warn;

// ─── Payload ─────────────────────────────────────────────────────────────────

/// An in-progress collectible the user is close to earning.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseToEarning {
  /// Display label, e.g. `"Fleet Foxes - 5 Hours Listening"`.
  pub name:      String,
  /// Remaining listening time in coarse units, e.g. `"2 hours 10 minutes"`.
  pub time_left: String,
  pub fraction:  f64,
}

/// A new-release suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopPick {
  pub artist_name: String,
  pub album_name:  String,
  pub image_url:   Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
  /// Distinct artists whose accumulator moved this week.
  pub artist_count:     u64,
  pub album_count:      u64,
  pub track_count:      u64,
  /// Collectibles earned (status set) in the window.
  pub completed_count:  u64,
  /// Top three in-progress collectibles by progress, descending.
  pub close_to_earning: Vec<CloseToEarning>,
  pub top_picks:        Vec<TopPick>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Assemble the weekly summary for one user as of `now`.
pub async fn build<S, L>(
  store: &S,
  source: &L,
  user_id: &str,
  now: DateTime<Utc>,
) -> Result<WeeklySummary, S::Error>
where
  S: CollectibleStore,
  L: ListeningSource,
{
  let since = now - Duration::days(7);

  let accumulators = store
    .collectibles_updated_since(user_id, Some(CollectibleKind::StreamedMilliseconds), since)
    .await?;
  let artist_count = accumulators
    .iter()
    .filter(|c| c.touched_since_creation())
    .count() as u64;

  let album_count = store
    .count_library_rows_updated_since(user_id, LibraryRowKind::Album, since)
    .await?;
  let track_count = store
    .count_library_rows_updated_since(user_id, LibraryRowKind::Track, since)
    .await?;

  let all = store.collectibles_updated_since(user_id, None, since).await?;
  let completed_count = all.iter().filter(|c| c.status.is_some()).count() as u64;

  // In-progress records carry no status. Records past the final tier
  // have no further target and drop out of the ranking.
  let mut in_progress: Vec<(f64, &CollectibleRecord)> = all
    .iter()
    .filter(|c| c.status.is_none())
    .filter_map(|c| tiers::progress_fraction(c.streamed_ms).map(|f| (f, c)))
    .collect();
  in_progress
    .sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

  let close_to_earning = in_progress
    .into_iter()
    .take(3)
    .filter_map(|(fraction, record)| {
      tiers::next_tier(record.streamed_ms).map(|next| CloseToEarning {
        name: format!(
          "{} - {}",
          record.artist.name,
          next.kind.display_name().unwrap_or(next.kind.discriminant()),
        ),
        time_left: tiers::format_remaining(next.remaining_ms),
        fraction,
      })
    })
    .collect();

  // Three random picks from the provider's new releases. A failed browse
  // costs the picks, never the summary.
  let top_picks = match source.new_releases(50).await {
    Ok(albums) => {
      let mut rng = rand::thread_rng();
      albums
        .choose_multiple(&mut rng, 3)
        .map(|album| TopPick {
          artist_name: album
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default(),
          album_name: album.name.clone(),
          image_url:  album.images.first().map(|i| i.url.clone()),
        })
        .collect()
    }
    Err(e) => {
      warn!(error = %e, "new-release browse failed; summary goes out without picks");
      Vec::new()
    }
  };

  Ok(WeeklySummary {
    artist_count,
    album_count,
    track_count,
    completed_count,
    close_to_earning,
    top_picks,
  })
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Flatten the summary into the email template's field list. Missing
/// slots (fewer than three entries) render as empty strings.
pub fn to_notification(
  summary: &WeeklySummary,
  recipient: &str,
  template: &str,
  subject: &str,
) -> Notification {
  let mut fields = vec![
    TemplateField::new("artist_count", summary.artist_count.to_string()),
    TemplateField::new("album_count", summary.album_count.to_string()),
    TemplateField::new("track_count", summary.track_count.to_string()),
    TemplateField::new("collectible_count", summary.completed_count.to_string()),
  ];

  for slot in 0..3 {
    let suffix = format!("0{}", slot + 1);
    let (name, time_left) = summary
      .close_to_earning
      .get(slot)
      .map(|c| (c.name.clone(), c.time_left.clone()))
      .unwrap_or_default();
    fields.push(TemplateField::new(format!("hours_away_{suffix}"), time_left));
    fields.push(TemplateField::new(format!("collectible_name_{suffix}"), name));
  }

  for slot in 0..3 {
    let suffix = format!("0{}", slot + 1);
    let (text, image) = summary
      .top_picks
      .get(slot)
      .map(|p| {
        (
          format!("{} - {}", p.artist_name, p.album_name),
          p.image_url.clone().unwrap_or_default(),
        )
      })
      .unwrap_or_default();
    fields.push(TemplateField::new(format!("top_pick_{suffix}"), text));
    fields.push(TemplateField::new(format!("top_pick_img_{suffix}"), image));
  }

  Notification {
    template:  template.to_owned(),
    subject:   Some(subject.to_owned()),
    recipient: recipient.to_owned(),
    fields,
  }
}
