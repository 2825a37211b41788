//! TOML-file-backed secret provider.
//!
//! Secrets live outside the main config file so the config can be
//! committed while the secrets file stays local. One TOML table per
//! bundle:
//!
//! ```toml
//! [spotify]
//! client_id = "..."
//! client_secret = "..."
//!
//! [notifier]
//! api_key = "..."
//! ```

use std::{collections::HashMap, path::PathBuf};

use encore_core::secrets::{SecretError, SecretProvider};

pub struct FileSecrets {
  path: PathBuf,
}

impl FileSecrets {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

fn bundle_from_str(raw: &str, name: &str) -> Result<HashMap<String, String>, SecretError> {
  let table: toml::Table = raw
    .parse()
    .map_err(|e| SecretError::InvalidRequest(format!("malformed secrets file: {e}")))?;

  let bundle = table
    .get(name)
    .ok_or_else(|| SecretError::NotFound(name.to_owned()))?
    .as_table()
    .ok_or_else(|| {
      SecretError::InvalidParameter(format!("secret bundle {name:?} is not a table"))
    })?;

  bundle
    .iter()
    .map(|(key, value)| {
      let value = value.as_str().ok_or_else(|| {
        SecretError::InvalidParameter(format!("secret {name}.{key} is not a string"))
      })?;
      Ok((key.clone(), value.to_owned()))
    })
    .collect()
}

impl SecretProvider for FileSecrets {
  async fn get(&self, name: &str) -> Result<HashMap<String, String>, SecretError> {
    if name.is_empty() {
      return Err(SecretError::InvalidParameter("empty secret name".to_owned()));
    }

    let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
      SecretError::InvalidRequest(format!(
        "cannot read secrets file {}: {e}",
        self.path.display()
      ))
    })?;

    bundle_from_str(&raw, name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const RAW: &str = r#"
[spotify]
client_id = "abc"
client_secret = "shh"

[broken]
nested = { not = "a string" }
"#;

  #[test]
  fn resolves_a_named_bundle() {
    let bundle = bundle_from_str(RAW, "spotify").unwrap();
    assert_eq!(bundle.get("client_id").map(String::as_str), Some("abc"));
    assert_eq!(bundle.len(), 2);
  }

  #[test]
  fn missing_bundle_is_not_found() {
    assert!(matches!(
      bundle_from_str(RAW, "notifier"),
      Err(SecretError::NotFound(name)) if name == "notifier"
    ));
  }

  #[test]
  fn non_string_values_are_invalid_parameters() {
    assert!(matches!(
      bundle_from_str(RAW, "broken"),
      Err(SecretError::InvalidParameter(_))
    ));
  }

  #[test]
  fn garbage_file_is_an_invalid_request() {
    assert!(matches!(
      bundle_from_str("not [ toml", "spotify"),
      Err(SecretError::InvalidRequest(_))
    ));
  }
}
