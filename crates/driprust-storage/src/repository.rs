//! Repository layer for database access

pub mod campaigns;
pub mod scheduled_messages;

pub use campaigns::CampaignRepository;
pub use scheduled_messages::{CampaignMessageRollup, ScheduledMessageRepository};
