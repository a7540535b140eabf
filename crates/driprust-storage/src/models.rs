//! Database models

use chrono::{DateTime, Utc};
use driprust_common::types::{CampaignId, ScheduledMessageId};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Campaign status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignStatus::Active => write!(f, "active"),
            CampaignStatus::Paused => write!(f, "paused"),
            CampaignStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            _ => Err(format!("Invalid campaign status: {}", s)),
        }
    }
}

/// Scheduled message status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledMessageStatus {
    Scheduled,
    Sent,
    Delivered,
    Failed,
}

impl std::fmt::Display for ScheduledMessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduledMessageStatus::Scheduled => write!(f, "scheduled"),
            ScheduledMessageStatus::Sent => write!(f, "sent"),
            ScheduledMessageStatus::Delivered => write!(f, "delivered"),
            ScheduledMessageStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ScheduledMessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ScheduledMessageStatus::Scheduled),
            "sent" => Ok(ScheduledMessageStatus::Sent),
            "delivered" => Ok(ScheduledMessageStatus::Delivered),
            "failed" => Ok(ScheduledMessageStatus::Failed),
            _ => Err(format!("Invalid scheduled message status: {}", s)),
        }
    }
}

/// One message template in a campaign sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Days after campaign creation on which this message goes out
    pub day_offset: u32,
    /// Message body with `{field}` placeholders
    pub body: String,
    /// Inactive templates are skipped when scheduling
    #[serde(default = "default_template_active")]
    pub active: bool,
}

fn default_template_active() -> bool {
    true
}

/// A contact to message
///
/// `phone` and `name` are first-class; any other field supplied by the
/// caller lands in `extra` and stays available for personalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Contact {
    /// Look up a field by placeholder key
    ///
    /// Returns `None` for unknown keys and for values that are empty
    /// after trimming, so callers can fall through to other sources.
    pub fn field_value(&self, key: &str) -> Option<String> {
        match key {
            "phone" => non_empty(&self.phone),
            "name" => self.name.as_deref().and_then(non_empty),
            _ => match self.extra.get(key)? {
                serde_json::Value::String(s) => non_empty(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
        }
    }

    /// Best available display name
    ///
    /// Checks `name`, then `full_name`, then `first_name` with an
    /// optional `last_name` appended.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().and_then(non_empty) {
            return Some(name);
        }
        if let Some(full) = self.field_value("full_name") {
            return Some(full);
        }
        let first = self.field_value("first_name")?;
        match self.field_value("last_name") {
            Some(last) => Some(format!("{} {}", first, last)),
            None => Some(first),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Campaign model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub status: String,
    pub total_contacts: i64,
    pub templates: Json<Vec<MessageTemplate>>,
    pub contacts: Json<Vec<Contact>>,
    pub sent_messages: i64,
    pub delivered_messages: i64,
    pub failed_messages: i64,
    pub replies: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Campaign {
    /// Get status enum
    pub fn status_enum(&self) -> Option<CampaignStatus> {
        self.status.parse().ok()
    }
}

/// Create campaign input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub templates: Vec<MessageTemplate>,
    pub contacts: Vec<Contact>,
}

/// Scheduled message model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub id: ScheduledMessageId,
    pub campaign_id: CampaignId,
    pub contact_phone: String,
    pub contact_name: Option<String>,
    pub message_text: String,
    pub template_day_offset: i64,
    pub scheduled_for: DateTime<Utc>,
    pub status: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledMessage {
    /// Get status enum
    pub fn status_enum(&self) -> Option<ScheduledMessageStatus> {
        self.status.parse().ok()
    }
}
