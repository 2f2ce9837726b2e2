//! Delivery notifications
//!
//! One-way messages handed off after the status-update transaction commits.
//! A notification failure is logged and never propagated back into the
//! lifecycle manager: the status change stands regardless.

use async_trait::async_trait;
use shared::Order;

/// Notification sink for order lifecycle events
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Called after an order transitions into Delivered (post-commit).
    async fn order_delivered(&self, order: &Order);
}

/// Posts an order-delivered event to a configured webhook endpoint
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn order_delivered(&self, order: &Order) {
        let payload = serde_json::json!({
            "event": "order_delivered",
            "event_id": uuid::Uuid::new_v4().to_string(),
            "order_id": order.id,
            "user_id": order.user_id,
            "total_price": order.total_price,
            "delivered_at": order.delivered_at,
        });

        match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(order_id = order.id, "Delivery notification sent");
            }
            Ok(resp) => {
                tracing::warn!(
                    order_id = order.id,
                    status = %resp.status(),
                    "Delivery notification rejected by endpoint"
                );
            }
            Err(e) => {
                tracing::warn!(order_id = order.id, error = %e, "Failed to send delivery notification");
            }
        }
    }
}

/// No-op sink for tests and for deployments without a webhook configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn order_delivered(&self, order: &Order) {
        tracing::debug!(order_id = order.id, "Delivery notification skipped (no sink configured)");
    }
}
