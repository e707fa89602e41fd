//! Outgoing email.
//!
//! Delivery sits behind [`EmailSender`] so the identity flows do not care
//! whether mail is logged locally or relayed over HTTP.

pub mod templates;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use carebridge_config::{MailConfig, MailProvider};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay is not configured: {0}")]
    NotConfigured(String),

    #[error("mail transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected the message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl EmailSender for LogMailer {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        info!(from = %self.from, to, subject, "email (log delivery)");
        debug!(body = html, "email body");
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, from: impl Into<String>) -> Result<Self, MailError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            from: from.into(),
        })
    }
}

#[async_trait]
impl EmailSender for HttpMailer {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let message = RelayMessage {
            from: &self.from,
            to,
            subject,
            html,
        };

        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }

        debug!(to, subject, "email handed to relay");
        Ok(())
    }
}

/// Build the sender selected by `mail.provider`.
pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn EmailSender>, MailError> {
    match config.provider {
        MailProvider::Log => Ok(Arc::new(LogMailer::new(config.from_address.clone()))),
        MailProvider::Http => {
            let endpoint = config
                .endpoint
                .clone()
                .filter(|endpoint| !endpoint.trim().is_empty())
                .ok_or_else(|| MailError::NotConfigured("mail.endpoint is required for the http provider".to_string()))?;
            Ok(Arc::new(HttpMailer::new(
                endpoint,
                config.api_key.clone(),
                config.from_address.clone(),
            )?))
        }
    }
}
