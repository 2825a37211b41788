//! Encore worker binary.
//!
//! One invocation processes one user, passed by the orchestration layer
//! as `--user-id` / `--refresh-token`. The run result is printed as a
//! single JSON line; a setup-phase failure also sets a non-zero exit
//! code.
//!
//! ```text
//! worker daily       --user-id u1 --refresh-token r1
//! worker single-item --user-id u1 --refresh-token r1
//! worker weekly      --user-id u1 --refresh-token r1
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use encore_core::secrets::SecretProvider as _;
use encore_notify::NotifyClient;
use encore_store_sqlite::SqliteStore;
use encore_worker::{
  config::WorkerConfig,
  runner::{self, Invocation, RunKind, RunResult},
  secrets::FileSecrets,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Encore listening-milestone worker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Accrue listening time over the last 24 hours of plays.
  Daily(InvocationArgs),
  /// Accrue over every recently played track, unfiltered.
  SingleItem(InvocationArgs),
  /// Send the read-only weekly progress email.
  Weekly(InvocationArgs),
}

#[derive(Args)]
struct InvocationArgs {
  /// The user to process.
  #[arg(long)]
  user_id: String,

  /// The user's provider refresh token.
  #[arg(long)]
  refresh_token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let result = match build_and_run(cli).await {
    Ok(result) => result,
    Err(e) => RunResult::failed(&e),
  };

  println!("{}", serde_json::to_string(&result)?);
  if !result.success {
    std::process::exit(1);
  }
  Ok(())
}

async fn build_and_run(cli: Cli) -> anyhow::Result<RunResult> {
  let config = WorkerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&config.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", config.store_path))?;

  let secrets = FileSecrets::new(&config.secrets_path);

  // The notifier API key is itself a secret bundle.
  let api_key = secrets
    .get("notifier")
    .await?
    .get("api_key")
    .cloned()
    .context("notifier secret bundle is missing api_key")?;
  let notifier = NotifyClient::new(&config.notifications.endpoint, api_key)?;

  let (kind, args) = match cli.command {
    Command::Daily(args) => (RunKind::Daily, args),
    Command::SingleItem(args) => (RunKind::SingleItem, args),
    Command::Weekly(args) => (RunKind::Weekly, args),
  };
  let invocation = Invocation {
    user_id:       args.user_id,
    refresh_token: args.refresh_token,
  };

  Ok(runner::run(kind, &invocation, &config, &store, &secrets, &notifier).await)
}
