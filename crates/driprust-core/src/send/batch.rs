//! Batch sender - sequential SMS dispatch with per-contact results
//!
//! One failed send never aborts the batch. Every contact gets exactly
//! one attempt and one entry in the report.

use driprust_storage::models::Contact;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::campaign::PersonalizationEngine;

use super::transport::SmsTransport;

const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(2000);

/// Outcome of one send attempt
#[derive(Debug, Clone, Serialize)]
pub struct ContactSendResult {
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a whole batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub campaign_id: Uuid,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<ContactSendResult>,
}

/// Batch sender - personalizes and dispatches one message per contact
pub struct BatchSender {
    transport: Arc<dyn SmsTransport>,
    engine: PersonalizationEngine,
    send_delay: Duration,
}

impl BatchSender {
    /// Create a new batch sender with the default pacing delay
    pub fn new(transport: Arc<dyn SmsTransport>) -> Self {
        Self {
            transport,
            engine: PersonalizationEngine::new(),
            send_delay: DEFAULT_SEND_DELAY,
        }
    }

    /// Override the pause between consecutive sends
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Send one personalized message to every contact, in order
    ///
    /// Sends are sequential with a pacing pause between consecutive
    /// attempts. Failures are recorded per contact and the batch keeps
    /// going.
    pub async fn send_batch(
        &self,
        campaign_id: Uuid,
        template: &str,
        contacts: &[Contact],
    ) -> BatchReport {
        let mut results = Vec::with_capacity(contacts.len());
        let mut sent = 0;
        let mut failed = 0;

        for (index, contact) in contacts.iter().enumerate() {
            if index > 0 && !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }

            let message = self.engine.personalize(template, contact);

            match self.transport.send_sms(&contact.phone, &message).await {
                Ok(message_id) => {
                    sent += 1;
                    results.push(ContactSendResult {
                        phone: contact.phone.clone(),
                        name: contact.display_name(),
                        status: "sent".to_string(),
                        message_id: Some(message_id),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("Failed to send to {}: {}", contact.phone, e);
                    failed += 1;
                    results.push(ContactSendResult {
                        phone: contact.phone.clone(),
                        name: contact.display_name(),
                        status: "failed".to_string(),
                        message_id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            "Batch for campaign {} finished: {} sent, {} failed",
            campaign_id, sent, failed
        );

        BatchReport {
            campaign_id,
            total: contacts.len(),
            sent,
            failed,
            results,
        }
    }
}
