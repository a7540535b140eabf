//! Campaign Manager - Campaign creation, scheduling, and lifecycle

use super::template::PersonalizationEngine;
use chrono::{Duration, Local, Utc};
use driprust_storage::db::DatabasePool;
use driprust_storage::models::{
    Campaign, CampaignStatus, CreateCampaign, ScheduledMessage, ScheduledMessageStatus,
};
use driprust_storage::repository::CampaignRepository;
use sqlx::types::Json;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Campaign manager errors
#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Campaign name is required")]
    EmptyName,

    #[error("At least one message template is required")]
    NoTemplates,

    #[error("At least one contact is required")]
    NoContacts,

    #[error("No active message template has a non-empty body")]
    NoActiveTemplates,

    #[error("Contact {0} is missing a phone number")]
    MissingPhone(usize),

    #[error("Template day offset {0} is out of range")]
    DayOffsetOutOfRange(u32),

    #[error("Campaign not found")]
    NotFound,

    #[error("Campaign is not active")]
    NotActive,

    #[error("Campaign is not paused")]
    NotPaused,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CampaignError {
    /// Whether the error comes from rejected input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CampaignError::EmptyName
                | CampaignError::NoTemplates
                | CampaignError::NoContacts
                | CampaignError::NoActiveTemplates
                | CampaignError::MissingPhone(_)
                | CampaignError::DayOffsetOutOfRange(_)
        )
    }
}

/// Campaign Manager - Creates campaigns and their message schedules
pub struct CampaignManager {
    campaign_repo: CampaignRepository,
    engine: PersonalizationEngine,
}

impl CampaignManager {
    /// Create a new campaign manager
    pub fn new(db_pool: DatabasePool) -> Self {
        Self {
            campaign_repo: CampaignRepository::new(db_pool.pool().clone()),
            engine: PersonalizationEngine::new(),
        }
    }

    /// Create a campaign and schedule one message per contact per active template
    ///
    /// Messages are personalized here, not at send time, so the stored
    /// text is exactly what will go out. Rows are ordered contact by
    /// contact, each contact getting the full template sequence before
    /// the next contact starts.
    pub async fn create_campaign(
        &self,
        input: CreateCampaign,
    ) -> Result<(Campaign, Vec<ScheduledMessage>), CampaignError> {
        // Validate input
        if input.name.trim().is_empty() {
            return Err(CampaignError::EmptyName);
        }
        if input.templates.is_empty() {
            return Err(CampaignError::NoTemplates);
        }
        if input.contacts.is_empty() {
            return Err(CampaignError::NoContacts);
        }

        let active_templates: Vec<_> = input
            .templates
            .iter()
            .filter(|t| t.active && !t.body.trim().is_empty())
            .cloned()
            .collect();
        if active_templates.is_empty() {
            return Err(CampaignError::NoActiveTemplates);
        }

        for (index, contact) in input.contacts.iter().enumerate() {
            if contact.phone.trim().is_empty() {
                return Err(CampaignError::MissingPhone(index));
            }
        }

        let campaign_id = Uuid::new_v4();
        let created_at = Utc::now();
        let local_now = created_at.with_timezone(&Local);

        // Contact-major fan-out
        let mut messages = Vec::with_capacity(input.contacts.len() * active_templates.len());
        for contact in &input.contacts {
            for template in &active_templates {
                // Offsets past the representable date range are bad input.
                let scheduled_for = created_at
                    .checked_add_signed(Duration::days(template.day_offset as i64))
                    .ok_or(CampaignError::DayOffsetOutOfRange(template.day_offset))?;
                messages.push(ScheduledMessage {
                    id: Uuid::new_v4(),
                    campaign_id,
                    contact_phone: contact.phone.clone(),
                    contact_name: contact.display_name(),
                    message_text: self.engine.personalize_at(&template.body, contact, local_now),
                    template_day_offset: template.day_offset as i64,
                    scheduled_for,
                    status: ScheduledMessageStatus::Scheduled.to_string(),
                    sent_at: None,
                    last_error: None,
                    created_at,
                });
            }
        }

        let campaign = Campaign {
            id: campaign_id,
            name: input.name,
            status: CampaignStatus::Active.to_string(),
            total_contacts: input.contacts.len() as i64,
            templates: Json(input.templates),
            contacts: Json(input.contacts),
            sent_messages: 0,
            delivered_messages: 0,
            failed_messages: 0,
            replies: 0,
            created_at,
            last_activity: created_at,
        };

        self.campaign_repo
            .create_with_schedule(&campaign, &messages)
            .await?;

        info!(
            "Campaign {} created with {} scheduled messages",
            campaign.id,
            messages.len()
        );

        Ok((campaign, messages))
    }

    /// Get a campaign by ID
    pub async fn get_campaign(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        self.campaign_repo
            .get(id)
            .await?
            .ok_or(CampaignError::NotFound)
    }

    /// Pause an active campaign
    pub async fn pause_campaign(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        let campaign = self.get_campaign(id).await?;
        if campaign.status_enum() != Some(CampaignStatus::Active) {
            return Err(CampaignError::NotActive);
        }

        let updated = self
            .campaign_repo
            .update_status(id, CampaignStatus::Paused)
            .await?
            .ok_or(CampaignError::NotFound)?;

        info!("Campaign {} paused", id);
        Ok(updated)
    }

    /// Resume a paused campaign
    pub async fn resume_campaign(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        let campaign = self.get_campaign(id).await?;
        if campaign.status_enum() != Some(CampaignStatus::Paused) {
            return Err(CampaignError::NotPaused);
        }

        let updated = self
            .campaign_repo
            .update_status(id, CampaignStatus::Active)
            .await?
            .ok_or(CampaignError::NotFound)?;

        info!("Campaign {} resumed", id);
        Ok(updated)
    }
}
