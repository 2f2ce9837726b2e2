//! Refund provider - external payment-provider integration
//!
//! Refunds for online methods go through the provider *before* any local
//! state changes; a provider failure aborts the whole update.

use async_trait::async_trait;
use shared::Payment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefundError {
    /// The provider processed the request and said no
    #[error("declined: {0}")]
    Declined(String),

    /// The provider could not be reached
    #[error("transport: {0}")]
    Transport(String),
}

/// External refund operation
#[async_trait]
pub trait RefundProvider: Send + Sync {
    async fn refund(&self, payment: &Payment, note: Option<&str>) -> Result<(), RefundError>;
}

/// Posts refund requests to a configured provider endpoint.
///
/// Without an endpoint the provider acknowledges every refund locally —
/// the integration point for the real provider API.
pub struct HttpRefundProvider {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpRefundProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl RefundProvider for HttpRefundProvider {
    async fn refund(&self, payment: &Payment, note: Option<&str>) -> Result<(), RefundError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(
                payment_id = payment.id,
                transaction_id = %payment.transaction_id,
                "No refund endpoint configured, acknowledging refund locally"
            );
            return Ok(());
        };

        let payload = serde_json::json!({
            "transaction_id": payment.transaction_id,
            "amount": payment.amount,
            "method": payment.method,
            "note": note,
        });

        let resp = self
            .client
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RefundError::Transport(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let reason = resp.text().await.unwrap_or_default();
            Err(RefundError::Declined(format!("{}: {}", status, reason)))
        }
    }
}

/// Scriptable provider for tests
pub struct StubRefundProvider {
    /// When set, every refund fails with this reason
    pub fail_with: Option<String>,
}

impl StubRefundProvider {
    pub fn succeeding() -> Self {
        Self { fail_with: None }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
        }
    }
}

#[async_trait]
impl RefundProvider for StubRefundProvider {
    async fn refund(&self, _payment: &Payment, _note: Option<&str>) -> Result<(), RefundError> {
        match &self.fail_with {
            Some(reason) => Err(RefundError::Declined(reason.clone())),
            None => Ok(()),
        }
    }
}
