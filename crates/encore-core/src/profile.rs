//! User profiles and the snapshot subset copied into collectibles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The registered user's profile, read from the store's `Auth|<user_id>`
/// row. Written by account provisioning, which is outside this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:       String,
  pub name:          String,
  pub email:         String,
  /// Absent means the user never chose, which counts as opted in.
  pub email_opt_in:  Option<bool>,
  pub profile_image: Option<String>,
  pub verifier_id:   Option<String>,
  /// Payout addresses keyed by chain or rail name.
  #[serde(default)]
  pub addresses:     BTreeMap<String, String>,
}

impl UserProfile {
  pub fn email_opted_in(&self) -> bool { self.email_opt_in.unwrap_or(true) }

  /// The subset denormalized into every collectible record.
  pub fn snapshot(&self) -> UserSnapshot {
    UserSnapshot {
      name:          self.name.clone(),
      profile_image: self.profile_image.clone(),
      verifier_id:   self.verifier_id.clone(),
      addresses:     self.addresses.clone(),
    }
  }
}

/// Minimal profile snapshot stored on collectible records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
  pub name:          String,
  pub profile_image: Option<String>,
  pub verifier_id:   Option<String>,
  #[serde(default)]
  pub addresses:     BTreeMap<String, String>,
}
