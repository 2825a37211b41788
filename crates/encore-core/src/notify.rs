//! The `Notifier` trait — one templated email per call.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single substitution handed to the email template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
  pub name:    String,
  pub content: String,
}

impl TemplateField {
  pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
    Self { name: name.into(), content: content.into() }
  }
}

/// A fully rendered notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub template:  String,
  pub subject:   Option<String>,
  pub recipient: String,
  pub fields:    Vec<TemplateField>,
}

/// Acknowledgement from the email service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
  pub transaction_id: String,
}

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
  #[error("email service rejected the request with status {status}: {body}")]
  Rejected { status: u16, body: String },

  #[error("email transport failure: {0}")]
  Transport(String),
}

pub trait Notifier: Send + Sync {
  fn send<'a>(
    &'a self,
    note: &'a Notification,
  ) -> impl Future<Output = Result<Delivery, NotifyError>> + Send + 'a;
}
