use std::time::Duration;

use async_trait::async_trait;
use lead_core::{RelayEnvelope, Submission};
use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("relay request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("relay returned HTTP {0}")]
    Status(u16),
    #[error("relay rejected lead: {0}")]
    Rejected(String),
}

/// Carries a lead to the relay endpoint.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: RelayTransport + ?Sized> RelayTransport for std::sync::Arc<T> {
    async fn submit(&self, submission: &Submission) -> Result<(), TransportError> {
        (**self).submit(submission).await
    }
}

#[derive(Clone)]
pub struct HttpRelayClient {
    http: Client,
    endpoint: String,
}

impl HttpRelayClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(Self::DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RelayTransport for HttpRelayClient {
    async fn submit(&self, submission: &Submission) -> Result<(), TransportError> {
        let res = self
            .http
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let envelope: RelayEnvelope = res.json().await?;
        if envelope.ok {
            Ok(())
        } else {
            Err(TransportError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "Unknown backend error".into()),
            ))
        }
    }
}
