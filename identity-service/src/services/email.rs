//! Outbound email: provider seam, HTTPS provider and the retrying dispatcher.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use service_core::retry::{retry_fixed, RetryPolicy};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::services::metrics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_address: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<(), ProviderError>;
}

#[derive(Serialize)]
struct ZeptoAddress<'a> {
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct ZeptoRecipient<'a> {
    email_address: ZeptoAddress<'a>,
}

#[derive(Serialize)]
struct ZeptoRequest<'a> {
    from: ZeptoAddress<'a>,
    to: Vec<ZeptoRecipient<'a>>,
    subject: &'a str,
    htmlbody: &'a str,
}

/// ZeptoMail transactional email API over HTTPS.
pub struct ZeptoMailProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    from_address: String,
    from_name: String,
}

impl ZeptoMailProvider {
    pub fn new(config: &EmailConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        if config.api_key.expose_secret().is_empty() {
            tracing::warn!("ZEPTOMAIL_API_KEY is empty; email delivery will be rejected");
        }

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }
}

#[async_trait]
impl EmailProvider for ZeptoMailProvider {
    async fn send(&self, email: &EmailMessage) -> Result<(), ProviderError> {
        let body = ZeptoRequest {
            from: ZeptoAddress {
                address: &self.from_address,
                name: Some(&self.from_name),
            },
            to: vec![ZeptoRecipient {
                email_address: ZeptoAddress {
                    address: &email.to_address,
                    name: Some(&email.to_name),
                },
            }],
            subject: &email.subject,
            htmlbody: &email.html_body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            tracing::info!(status = status.as_u16(), "Email accepted by provider");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Test provider that fails a fixed number of times before succeeding.
pub struct MockEmailProvider {
    failures_before_success: u64,
    send_count: AtomicU64,
    delivered: Mutex<Vec<EmailMessage>>,
}

impl Default for MockEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::failing(0)
    }

    pub fn failing(failures_before_success: u64) -> Self {
        Self {
            failures_before_success,
            send_count: AtomicU64::new(0),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing(u64::MAX)
    }

    /// Total attempts, failed ones included.
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<EmailMessage> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &EmailMessage) -> Result<(), ProviderError> {
        let attempt = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures_before_success {
            return Err(ProviderError::Rejected {
                status: 503,
                body: "mock outage".to_string(),
            });
        }

        tracing::info!(subject = %email.subject, "[MOCK] Email would be sent");
        self.delivered
            .lock()
            .map_err(|e| ProviderError::Connection(format!("Mock mutex poisoned: {}", e)))?
            .push(email.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { attempts: u32 },
    Failed { attempts: u32, reason: String },
}

/// Sends email through a provider with fixed-delay retry. Never returns an
/// error: exhausting the attempts yields `DeliveryOutcome::Failed`.
#[derive(Clone)]
pub struct NotificationDispatcher {
    provider: Arc<dyn EmailProvider>,
    policy: RetryPolicy,
}

impl NotificationDispatcher {
    pub fn new(provider: Arc<dyn EmailProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn from_config(provider: Arc<dyn EmailProvider>, config: &EmailConfig) -> Self {
        Self::new(
            provider,
            RetryPolicy::fixed(config.max_attempts, config.retry_delay()),
        )
    }

    #[tracing::instrument(skip(self, email), fields(subject = %email.subject))]
    pub async fn send(&self, email: &EmailMessage) -> DeliveryOutcome {
        let attempted = retry_fixed(&self.policy, "send_email", || self.provider.send(email)).await;

        let outcome = match attempted.result {
            Ok(()) => DeliveryOutcome::Delivered {
                attempts: attempted.attempts,
            },
            Err(e) => {
                tracing::error!(
                    attempts = attempted.attempts,
                    error = %e,
                    "Max retry attempts reached, email not delivered"
                );
                DeliveryOutcome::Failed {
                    attempts: attempted.attempts,
                    reason: e.to_string(),
                }
            }
        };

        metrics::record_email(matches!(outcome, DeliveryOutcome::Delivered { .. }));
        outcome
    }

    /// Send on a spawned task so retries never hold up the caller.
    pub fn dispatch_in_background(
        &self,
        email: EmailMessage,
    ) -> tokio::task::JoinHandle<DeliveryOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.send(&email).await })
    }
}
