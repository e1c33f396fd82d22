//! Mail transport
//!
//! Thin seam over the external mail provider. The transport accepts a
//! fully-rendered message and either delivers it or returns an error;
//! there is no partial-send state. Retry policy lives in the worker, not
//! here.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

// == Mail Error ==
/// Error raised by the mail transport.
#[derive(Error, Debug)]
pub enum MailError {
    /// The provider rejected or never received the message
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Convenience Result type for transport operations.
pub type MailResult<T> = std::result::Result<T, MailError>;

// == Email ==
/// A fully-rendered outbound email.
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    /// Recipient address
    pub to: String,
    /// Sender address
    pub from: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html_body: String,
}

// == Mail Transport Trait ==
/// Delivery surface for outbound email.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers one email. An `Ok` return means the provider accepted it.
    async fn send(&self, email: &Email) -> MailResult<()>;
}

// == HTTP Mailer ==
/// Mail transport over an HTTP provider API.
///
/// Posts the rendered message as JSON to the configured endpoint, with an
/// optional bearer token. Any non-success status is a delivery failure.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMailer {
    /// Creates a mailer for the given provider endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, email: &Email) -> MailResult<()> {
        let mut request = self.client.post(&self.endpoint).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| MailError::Delivery(err.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Delivery(format!(
                "mail provider returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
