//! Run-level plumbing: the setup phase, coordinator/summarizer dispatch,
//! and the notification decision.
//!
//! The failure contract mirrors the orchestrator's expectations: a run
//! reports `{"success": false}` only when the setup phase fails (secrets,
//! token refresh, event listing, profile load). Once processing starts,
//! per-item failures are absorbed and the run reports success.

use anyhow::Context as _;
use chrono::Utc;
use encore_core::{
  notify::{Notification, Notifier},
  profile::UserProfile,
  secrets::SecretProvider,
  source::ListeningSource as _,
  store::CollectibleStore,
};
use encore_spotify::{Credentials, SpotifyClient};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
  accrual::{Coordinator, WindowPolicy},
  config::WorkerConfig,
  pacing::WritePacer,
  summary,
};

// ─── Invocation contract ─────────────────────────────────────────────────────

/// What the orchestrator passes for one user.
#[derive(Debug, Clone)]
pub struct Invocation {
  pub user_id:       String,
  pub refresh_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
  /// Accrue over the last 24 hours of plays (scheduled daily).
  Daily,
  /// Accrue over every returned play (integration-change trigger).
  SingleItem,
  /// Read-only weekly progress email.
  Weekly,
}

/// The JSON result printed for the orchestrator.
#[derive(Debug, Serialize)]
pub struct RunResult {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
}

impl RunResult {
  pub fn ok() -> Self { Self { success: true, error: None } }

  pub fn failed(err: &anyhow::Error) -> Self {
    Self { success: false, error: Some(format!("{err:#}")) }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

pub async fn run<S, P, N>(
  kind: RunKind,
  invocation: &Invocation,
  config: &WorkerConfig,
  store: &S,
  secrets: &P,
  notifier: &N,
) -> RunResult
where
  S: CollectibleStore,
  P: SecretProvider,
  N: Notifier,
{
  match execute(kind, invocation, config, store, secrets, notifier).await {
    Ok(()) => RunResult::ok(),
    Err(e) => {
      error!(user = %invocation.user_id, error = %format!("{e:#}"), "run failed");
      RunResult::failed(&e)
    }
  }
}

async fn execute<S, P, N>(
  kind: RunKind,
  invocation: &Invocation,
  config: &WorkerConfig,
  store: &S,
  secrets: &P,
  notifier: &N,
) -> anyhow::Result<()>
where
  S: CollectibleStore,
  P: SecretProvider,
  N: Notifier,
{
  // ── Setup phase — failures here abort the run. ────────────────────────
  let spotify_secrets = secrets.get("spotify").await?;
  let creds = Credentials {
    client_id:     spotify_secrets
      .get("client_id")
      .cloned()
      .context("spotify secret bundle is missing client_id")?,
    client_secret: spotify_secrets
      .get("client_secret")
      .cloned()
      .context("spotify secret bundle is missing client_secret")?,
  };

  let client = SpotifyClient::new()?;
  let token = client
    .refresh_access_token(&creds, &invocation.refresh_token)
    .await?;
  let session = client.session(token);

  let user = store
    .get_profile(&invocation.user_id)
    .await?
    .with_context(|| format!("user {} not found", invocation.user_id))?;

  let now = Utc::now();

  // ── Processing phase — per-item failures are absorbed. ────────────────
  match kind {
    RunKind::Daily | RunKind::SingleItem => {
      let events = session.recently_played(config.recent_limit).await?;
      info!(user = %user.user_id, events = events.len(), "fetched recently played");

      let policy = match kind {
        RunKind::Daily => WindowPolicy::RecentDay,
        _ => WindowPolicy::AllReturned,
      };
      let pacer = WritePacer::new(config.write_interval());
      let summary = Coordinator::new(store, &session, &pacer)
        .process_playback_window(&user, &events, policy, now)
        .await;
      info!(
        writes = summary.writes,
        skipped = summary.skipped,
        ready = summary.ready_to_mint.len(),
        "playback window processed"
      );

      if !summary.ready_to_mint.is_empty() {
        let note = Notification {
          template:  config.notifications.collectible_template.clone(),
          subject:   Some(config.notifications.collectible_subject.clone()),
          recipient: user.email.clone(),
          fields:    Vec::new(),
        };
        dispatch(notifier, config, &user, note).await;
      }
    }

    RunKind::Weekly => {
      let weekly = summary::build(store, &session, &invocation.user_id, now).await?;
      info!(
        artists = weekly.artist_count,
        completed = weekly.completed_count,
        "weekly summary assembled"
      );
      let note = summary::to_notification(
        &weekly,
        &user.email,
        &config.notifications.weekly_template,
        &config.notifications.weekly_subject,
      );
      dispatch(notifier, config, &user, note).await;
    }
  }

  Ok(())
}

/// Send one notification, honoring the config switch and the user's
/// opt-out. Dispatch failure is logged and absorbed — it never fails a
/// run that already wrote its records.
async fn dispatch<N: Notifier>(
  notifier: &N,
  config: &WorkerConfig,
  user: &UserProfile,
  note: Notification,
) {
  if !config.notifications.enabled {
    debug!("notifications disabled; skipping send");
    return;
  }
  if !user.email_opted_in() {
    debug!(user = %user.user_id, "user opted out of email; skipping send");
    return;
  }

  match notifier.send(&note).await {
    Ok(delivery) => {
      info!(
        recipient = %note.recipient,
        transaction = %delivery.transaction_id,
        template = %note.template,
        "notification sent"
      );
    }
    Err(e) => warn!(error = %e, "notification dispatch failed; continuing"),
  }
}
