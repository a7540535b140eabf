//! SMS transport trait

use async_trait::async_trait;
use thiserror::Error;

/// SMS delivery errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway returned status {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

/// Anything that can deliver a single SMS
///
/// Returns the gateway's message ID on success.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<String, TransportError>;
}
