//! Webhook notifier
//!
//! Posts each batch as `{"content": "...", "records": [...]}` JSON, the shape
//! chat webhooks accept for plain messages.

use crate::output::message::format_batch;
use crate::output::traits::{Notifier, NotifyError, NotifyResult};
use crate::watcher::ChangeRecord;
use async_trait::async_trait;
use reqwest::Client;

/// Delivers change batches to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, records: &[ChangeRecord]) -> NotifyResult<()> {
        let payload = serde_json::json!({
            "content": format_batch(records),
            "records": records,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        tracing::info!("Sent {} change record(s) to webhook", records.len());
        Ok(())
    }
}
