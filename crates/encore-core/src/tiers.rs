//! The threshold engine — pure tier arithmetic, no I/O.
//!
//! Listening tiers are fixed hour multiples. All crossing logic is driven
//! by the [`TIERS`] table; adding a tier means adding a row, nothing else.

use crate::collectible::CollectibleKind;

pub const HOUR_MS: u64 = 3_600_000;

/// Tier table in ascending threshold order.
pub const TIERS: [(CollectibleKind, u64); 5] = [
  (CollectibleKind::Streamed01Hour, HOUR_MS),
  (CollectibleKind::Streamed05Hours, 5 * HOUR_MS),
  (CollectibleKind::Streamed10Hours, 10 * HOUR_MS),
  (CollectibleKind::Streamed15Hours, 15 * HOUR_MS),
  (CollectibleKind::Streamed25Hours, 25 * HOUR_MS),
];

/// Every tier whose threshold lies in `(previous_ms, new_ms]`, ascending.
///
/// Crossing is computed against the previous accumulated value, so each
/// tier is reported exactly once across repeated invocations even under
/// at-least-once delivery. Reaching a threshold exactly counts as
/// crossing it.
pub fn tiers_crossed(previous_ms: u64, new_ms: u64) -> Vec<CollectibleKind> {
  TIERS
    .iter()
    .filter(|(_, threshold)| previous_ms < *threshold && new_ms >= *threshold)
    .map(|(kind, _)| *kind)
    .collect()
}

/// The next uncrossed tier and the listening time still needed for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextTier {
  pub kind:         CollectibleKind,
  pub threshold_ms: u64,
  pub remaining_ms: u64,
}

/// `None` once the final tier is reached: there is no further target.
pub fn next_tier(accumulated_ms: u64) -> Option<NextTier> {
  TIERS
    .iter()
    .find(|(_, threshold)| accumulated_ms < *threshold)
    .map(|&(kind, threshold_ms)| NextTier {
      kind,
      threshold_ms,
      remaining_ms: threshold_ms - accumulated_ms,
    })
}

/// Fraction of progress toward the next uncrossed tier, in `[0, 1)`.
///
/// The denominator is the next tier's absolute threshold, not the band
/// width: between the 1h and 5h tiers the fraction is `ms / 5h`. Above
/// the final tier there is no target and the fraction is `None`.
pub fn progress_fraction(accumulated_ms: u64) -> Option<f64> {
  next_tier(accumulated_ms)
    .map(|next| accumulated_ms as f64 / next.threshold_ms as f64)
}

/// Format a remaining duration using its coarsest applicable units:
/// hours and minutes, or minutes, or seconds. Zero-valued leading units
/// are never shown.
pub fn format_remaining(ms: u64) -> String {
  let hours = ms / HOUR_MS;
  let minutes = (ms % HOUR_MS) / 60_000;
  let seconds = (ms % 60_000) / 1_000;

  if hours > 0 && minutes > 0 {
    format!("{} {}", unit(hours, "hour"), unit(minutes, "minute"))
  } else if hours > 0 {
    unit(hours, "hour")
  } else if minutes > 0 {
    unit(minutes, "minute")
  } else {
    unit(seconds, "second")
  }
}

fn unit(n: u64, name: &str) -> String {
  if n == 1 {
    format!("1 {name}")
  } else {
    format!("{n} {name}s")
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::collectible::CollectibleKind::*;

  #[test]
  fn crossing_one_hour_exactly_counts() {
    assert_eq!(tiers_crossed(0, HOUR_MS), vec![Streamed01Hour]);
  }

  #[test]
  fn crossing_excludes_previously_reached_tiers() {
    // Already past 1h; only the 5h tier is newly crossed.
    assert_eq!(tiers_crossed(4 * HOUR_MS, 6 * HOUR_MS), vec![Streamed05Hours]);
    // Exactly at a threshold before the event: that tier already fired.
    assert_eq!(tiers_crossed(HOUR_MS, HOUR_MS + 1), vec![]);
  }

  #[test]
  fn one_event_can_cross_several_tiers_in_order() {
    assert_eq!(
      tiers_crossed(0, 26 * HOUR_MS),
      vec![
        Streamed01Hour,
        Streamed05Hours,
        Streamed10Hours,
        Streamed15Hours,
        Streamed25Hours,
      ]
    );
    assert_eq!(
      tiers_crossed(2 * HOUR_MS, 12 * HOUR_MS),
      vec![Streamed05Hours, Streamed10Hours]
    );
  }

  #[test]
  fn no_change_crosses_nothing() {
    assert_eq!(tiers_crossed(HOUR_MS, HOUR_MS), vec![]);
    assert_eq!(tiers_crossed(0, 0), vec![]);
  }

  #[test]
  fn next_tier_walks_the_table() {
    assert_eq!(next_tier(0).unwrap().kind, Streamed01Hour);
    assert_eq!(next_tier(HOUR_MS - 1).unwrap().remaining_ms, 1);
    // Reaching a threshold exactly moves the target to the next tier.
    let next = next_tier(HOUR_MS).unwrap();
    assert_eq!(next.kind, Streamed05Hours);
    assert_eq!(next.remaining_ms, 4 * HOUR_MS);
    assert_eq!(next_tier(25 * HOUR_MS), None);
    assert_eq!(next_tier(40 * HOUR_MS), None);
  }

  #[test]
  fn progress_is_monotone_within_a_band_and_resets_at_boundaries() {
    let in_band = [
      2 * HOUR_MS,
      3 * HOUR_MS,
      5 * HOUR_MS - 1,
    ];
    let fractions: Vec<f64> =
      in_band.iter().map(|&ms| progress_fraction(ms).unwrap()).collect();
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));

    // Denominator is the next tier's absolute threshold.
    assert_eq!(progress_fraction(2 * HOUR_MS), Some(0.4));
    // Crossing into a new band drops the fraction.
    assert!(progress_fraction(5 * HOUR_MS).unwrap() < progress_fraction(5 * HOUR_MS - 1).unwrap());
  }

  #[test]
  fn progress_is_none_past_the_final_tier() {
    assert_eq!(progress_fraction(25 * HOUR_MS), None);
    assert_eq!(progress_fraction(100 * HOUR_MS), None);
  }

  #[test]
  fn remaining_time_uses_coarsest_units_only() {
    assert_eq!(format_remaining(2 * HOUR_MS + 30 * 60_000), "2 hours 30 minutes");
    assert_eq!(format_remaining(HOUR_MS), "1 hour");
    assert_eq!(format_remaining(45 * 60_000), "45 minutes");
    assert_eq!(format_remaining(60_000), "1 minute");
    assert_eq!(format_remaining(12_000), "12 seconds");
    assert_eq!(format_remaining(0), "0 seconds");
    // Sub-minute remainders are dropped once minutes apply.
    assert_eq!(format_remaining(61_500), "1 minute");
  }
}
