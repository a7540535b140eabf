//! Shared API state

use driprust_core::SmsTransport;
use driprust_storage::DatabasePool;
use std::sync::Arc;
use std::time::Duration;

/// Shared state for API handlers
pub struct AppState {
    pub db_pool: DatabasePool,
    pub transport: Arc<dyn SmsTransport>,
    pub send_delay: Duration,
}
