//! SMS gateway integration
//!
//! Talks to the configured SMS gateway over its HTTP API. One POST per
//! message, JSON in and out.

use async_trait::async_trait;
use driprust_common::config::GatewayConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::transport::{SmsTransport, TransportError};

/// Raw gateway API response
#[derive(Debug, Deserialize)]
struct GatewayApiResponse {
    id: String,
}

/// SMS gateway HTTP client
pub struct SmsGatewayClient {
    config: GatewayConfig,
    client: Client,
}

impl SmsGatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl SmsTransport for SmsGatewayClient {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<String, TransportError> {
        let url = format!("{}/messages", self.config.url);

        debug!("Sending SMS to {} via {}", phone, url);

        let mut request = self.client.post(&url).json(&serde_json::json!({
            "phone": phone,
            "message": message,
        }));

        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Gateway request failed: {}", e);
            TransportError::Request(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected { status, detail });
        }

        let api_response: GatewayApiResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse gateway response: {}", e);
            TransportError::Request(format!("Failed to parse gateway response: {}", e))
        })?;

        Ok(api_response.id)
    }
}
