//! Campaign repository

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Campaign, CampaignStatus, ScheduledMessage};

/// Campaign repository
#[derive(Clone)]
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    /// Create a new campaign repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a campaign together with its scheduled messages
    ///
    /// Runs in a single transaction: either the campaign and every
    /// message land, or nothing does.
    pub async fn create_with_schedule(
        &self,
        campaign: &Campaign,
        messages: &[ScheduledMessage],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, name, status, total_contacts, templates, contacts,
                sent_messages, delivered_messages, failed_messages, replies,
                created_at, last_activity
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.status)
        .bind(campaign.total_contacts)
        .bind(&campaign.templates)
        .bind(&campaign.contacts)
        .bind(campaign.sent_messages)
        .bind(campaign.delivered_messages)
        .bind(campaign.failed_messages)
        .bind(campaign.replies)
        .bind(campaign.created_at)
        .bind(campaign.last_activity)
        .execute(&mut *tx)
        .await?;

        for message in messages {
            sqlx::query(
                r#"
                INSERT INTO scheduled_messages (
                    id, campaign_id, contact_phone, contact_name, message_text,
                    template_day_offset, scheduled_for, status, sent_at,
                    last_error, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(message.id)
            .bind(message.campaign_id)
            .bind(&message.contact_phone)
            .bind(&message.contact_name)
            .bind(&message.message_text)
            .bind(message.template_day_offset)
            .bind(message.scheduled_for)
            .bind(&message.status)
            .bind(message.sent_at)
            .bind(&message.last_error)
            .bind(message.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get a campaign by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<Campaign>, sqlx::Error> {
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List all campaigns, newest first
    pub async fn list_all(&self) -> Result<Vec<Campaign>, sqlx::Error> {
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
    }

    /// Update campaign status
    pub async fn update_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        sqlx::query_as::<_, Campaign>(
            "UPDATE campaigns SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(status.to_string())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Record replies against a campaign
    pub async fn increment_replies(
        &self,
        id: Uuid,
        by: i64,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        sqlx::query_as::<_, Campaign>(
            "UPDATE campaigns SET replies = replies + ? WHERE id = ? RETURNING *",
        )
        .bind(by)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Count all campaigns
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM campaigns")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
