//! Common types for DripRust

use uuid::Uuid;

/// Unique identifier for campaigns
pub type CampaignId = Uuid;

/// Unique identifier for scheduled messages
pub type ScheduledMessageId = Uuid;
