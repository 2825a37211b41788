//! The `SecretProvider` trait — named bundles of credential strings.

use std::{collections::HashMap, future::Future};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SecretError {
  #[error("secret bundle not found: {0:?}")]
  NotFound(String),

  /// The provider could not service the request (unreadable backing
  /// store, malformed contents).
  #[error("invalid secret request: {0}")]
  InvalidRequest(String),

  /// The request itself was malformed (empty name, wrong value shape).
  #[error("invalid secret parameter: {0}")]
  InvalidParameter(String),
}

/// Resolves a bundle name (e.g. `"spotify"`) to its key/value pairs.
/// Setup-phase failures here abort the whole run.
pub trait SecretProvider: Send + Sync {
  fn get<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<HashMap<String, String>, SecretError>> + Send + 'a;
}
