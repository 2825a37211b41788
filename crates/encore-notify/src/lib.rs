//! HTTP client for the transactional-email service.
//!
//! The service takes a template name, a list of field substitutions and a
//! recipient, authenticated with an API key header. One call, one email.

use std::time::Duration;

use encore_core::notify::{Delivery, Notification, Notifier, NotifyError, TemplateField};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Wire shape of the `/email/send` request body.
#[derive(Serialize)]
struct SendRequest<'a> {
  #[serde(rename = "templateName")]
  template_name: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  subject: Option<&'a str>,
  #[serde(rename = "templateContent")]
  template_content: &'a [TemplateField],
  #[serde(rename = "emailAddress")]
  email_address: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
  #[serde(rename = "transactionId")]
  transaction_id: String,
}

/// Email-service client. Cheap to clone.
#[derive(Clone)]
pub struct NotifyClient {
  http:     Client,
  endpoint: String,
  api_key:  String,
}

impl NotifyClient {
  pub fn new(
    endpoint: impl Into<String>,
    api_key: impl Into<String>,
  ) -> Result<Self, NotifyError> {
    let http = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| NotifyError::Transport(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { http, endpoint: endpoint.into(), api_key: api_key.into() })
  }
}

impl Notifier for NotifyClient {
  async fn send(&self, note: &Notification) -> Result<Delivery, NotifyError> {
    let body = SendRequest {
      template_name:    &note.template,
      subject:          note.subject.as_deref(),
      template_content: &note.fields,
      email_address:    &note.recipient,
    };

    let resp = self
      .http
      .post(&self.endpoint)
      .header("x-api-key", &self.api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| NotifyError::Transport(e.to_string()))?;

    let status = resp.status();
    let text = resp
      .text()
      .await
      .map_err(|e| NotifyError::Transport(e.to_string()))?;

    if !status.is_success() {
      return Err(NotifyError::Rejected { status: status.as_u16(), body: text });
    }

    // The service answers with a transaction id; fall back to the raw
    // body if the shape ever changes.
    let transaction_id = serde_json::from_str::<SendResponse>(&text)
      .map(|r| r.transaction_id)
      .unwrap_or(text);
    Ok(Delivery { transaction_id })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn send_request_serializes_to_the_service_shape() {
    let fields = vec![TemplateField::new("artist_count", "4")];
    let body = SendRequest {
      template_name:    "Weekly Progress Email",
      subject:          None,
      template_content: &fields,
      email_address:    "alice@example.com",
    };

    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["templateName"], "Weekly Progress Email");
    assert_eq!(json["templateContent"][0]["name"], "artist_count");
    assert_eq!(json["emailAddress"], "alice@example.com");
    // Absent subject is omitted entirely, not sent as null.
    assert!(json.get("subject").is_none());
  }
}
