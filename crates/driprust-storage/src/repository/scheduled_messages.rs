//! Scheduled message repository

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::ScheduledMessage;

/// Scheduled message repository
#[derive(Clone)]
pub struct ScheduledMessageRepository {
    pool: SqlitePool,
}

impl ScheduledMessageRepository {
    /// Create a new scheduled message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a scheduled message by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<ScheduledMessage>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledMessage>("SELECT * FROM scheduled_messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List messages for a campaign ordered by send time
    pub async fn list_by_campaign(
        &self,
        campaign_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ScheduledMessage>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledMessage>(
            r#"
            SELECT * FROM scheduled_messages
            WHERE campaign_id = ?
            ORDER BY scheduled_for ASC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(campaign_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Count messages for a campaign
    pub async fn count_by_campaign(&self, campaign_id: Uuid) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM scheduled_messages WHERE campaign_id = ?")
                .bind(campaign_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    /// Mark a message as sent
    pub async fn mark_sent(&self, id: Uuid) -> Result<Option<ScheduledMessage>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledMessage>(
            "UPDATE scheduled_messages SET status = 'sent', sent_at = ? WHERE id = ? RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Mark a message as delivered, keeping the original send time
    pub async fn mark_delivered(&self, id: Uuid) -> Result<Option<ScheduledMessage>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledMessage>(
            r#"
            UPDATE scheduled_messages
            SET status = 'delivered', sent_at = COALESCE(sent_at, ?)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Mark a message as failed with an error description
    pub async fn mark_failed(
        &self,
        id: Uuid,
        error: &str,
    ) -> Result<Option<ScheduledMessage>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledMessage>(
            r#"
            UPDATE scheduled_messages
            SET status = 'failed', last_error = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(error)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Aggregate per-campaign message statistics
    ///
    /// `sent` counts delivered messages too. `next_scheduled` is the
    /// earliest still-scheduled message strictly after `now`.
    pub async fn rollup_by_campaign(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CampaignMessageRollup>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                campaign_id,
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE status IN ('sent', 'delivered')) as sent,
                COUNT(*) FILTER (WHERE status = 'delivered') as delivered,
                COUNT(*) FILTER (WHERE status = 'failed') as failed,
                MAX(sent_at) as last_sent_at,
                MIN(CASE WHEN status = 'scheduled' AND scheduled_for > ?
                    THEN scheduled_for END) as next_scheduled
            FROM scheduled_messages
            GROUP BY campaign_id
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::rollup_from_row).collect())
    }

    /// Aggregate message statistics for a single campaign
    pub async fn rollup_for_campaign(
        &self,
        campaign_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CampaignMessageRollup, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                ? as campaign_id,
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE status IN ('sent', 'delivered')) as sent,
                COUNT(*) FILTER (WHERE status = 'delivered') as delivered,
                COUNT(*) FILTER (WHERE status = 'failed') as failed,
                MAX(sent_at) as last_sent_at,
                MIN(CASE WHEN status = 'scheduled' AND scheduled_for > ?
                    THEN scheduled_for END) as next_scheduled
            FROM scheduled_messages
            WHERE campaign_id = ?
            "#,
        )
        .bind(campaign_id)
        .bind(now)
        .bind(campaign_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::rollup_from_row(&row))
    }

    fn rollup_from_row(row: &sqlx::sqlite::SqliteRow) -> CampaignMessageRollup {
        CampaignMessageRollup {
            campaign_id: row.get("campaign_id"),
            total: row.get::<Option<i64>, _>("total").unwrap_or(0),
            sent: row.get::<Option<i64>, _>("sent").unwrap_or(0),
            delivered: row.get::<Option<i64>, _>("delivered").unwrap_or(0),
            failed: row.get::<Option<i64>, _>("failed").unwrap_or(0),
            last_sent_at: row.get("last_sent_at"),
            next_scheduled: row.get("next_scheduled"),
        }
    }
}

/// Per-campaign message statistics
#[derive(Debug, Clone, Default)]
pub struct CampaignMessageRollup {
    pub campaign_id: Uuid,
    pub total: i64,
    pub sent: i64,
    pub delivered: i64,
    pub failed: i64,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub next_scheduled: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabasePool;
    use crate::models::{Campaign, CampaignStatus, Contact, MessageTemplate, ScheduledMessageStatus};
    use crate::repository::CampaignRepository;
    use chrono::Duration;
    use sqlx::types::Json;

    fn create_test_campaign() -> Campaign {
        let now = Utc::now();
        Campaign {
            id: Uuid::new_v4(),
            name: "Follow-up series".to_string(),
            status: CampaignStatus::Active.to_string(),
            total_contacts: 2,
            templates: Json(vec![MessageTemplate {
                day_offset: 0,
                body: "Hi {name}".to_string(),
                active: true,
            }]),
            contacts: Json(vec![Contact::default(), Contact::default()]),
            sent_messages: 0,
            delivered_messages: 0,
            failed_messages: 0,
            replies: 0,
            created_at: now,
            last_activity: now,
        }
    }

    fn create_test_message(campaign: &Campaign, offset_days: i64) -> ScheduledMessage {
        ScheduledMessage {
            id: Uuid::new_v4(),
            campaign_id: campaign.id,
            contact_phone: "+15551234567".to_string(),
            contact_name: None,
            message_text: "Hi".to_string(),
            template_day_offset: offset_days,
            scheduled_for: campaign.created_at + Duration::days(offset_days),
            status: ScheduledMessageStatus::Scheduled.to_string(),
            sent_at: None,
            last_error: None,
            created_at: campaign.created_at,
        }
    }

    async fn seed(db: &DatabasePool, campaign: &Campaign, messages: &[ScheduledMessage]) {
        CampaignRepository::new(db.pool().clone())
            .create_with_schedule(campaign, messages)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_by_campaign_ordered_by_send_time() {
        let db = DatabasePool::in_memory().await.unwrap();
        let repo = ScheduledMessageRepository::new(db.pool().clone());

        let campaign = create_test_campaign();
        let later = create_test_message(&campaign, 3);
        let sooner = create_test_message(&campaign, 1);
        seed(&db, &campaign, &[later.clone(), sooner.clone()]).await;

        let messages = repo.list_by_campaign(campaign.id, 50, 0).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, sooner.id);
        assert_eq!(messages[1].id, later.id);

        let page = repo.list_by_campaign(campaign.id, 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, later.id);
    }

    #[tokio::test]
    async fn test_mark_sent_and_delivered() {
        let db = DatabasePool::in_memory().await.unwrap();
        let repo = ScheduledMessageRepository::new(db.pool().clone());

        let campaign = create_test_campaign();
        let message = create_test_message(&campaign, 0);
        seed(&db, &campaign, &[message.clone()]).await;

        let sent = repo.mark_sent(message.id).await.unwrap().unwrap();
        assert_eq!(sent.status_enum(), Some(ScheduledMessageStatus::Sent));
        let sent_at = sent.sent_at.unwrap();

        let delivered = repo.mark_delivered(message.id).await.unwrap().unwrap();
        assert_eq!(delivered.status, "delivered");
        assert_eq!(delivered.sent_at.unwrap(), sent_at);

        // The transition is persisted, not just reflected in RETURNING.
        let stored = repo.get(message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, "delivered");
        assert_eq!(stored.sent_at.unwrap(), sent_at);
    }

    #[tokio::test]
    async fn test_mark_failed_records_error() {
        let db = DatabasePool::in_memory().await.unwrap();
        let repo = ScheduledMessageRepository::new(db.pool().clone());

        let campaign = create_test_campaign();
        let message = create_test_message(&campaign, 0);
        seed(&db, &campaign, &[message.clone()]).await;

        let failed = repo
            .mark_failed(message.id, "gateway timeout")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failed.status, "failed");
        assert_eq!(failed.last_error.as_deref(), Some("gateway timeout"));
    }

    #[tokio::test]
    async fn test_rollup_counts_and_next_scheduled() {
        let db = DatabasePool::in_memory().await.unwrap();
        let repo = ScheduledMessageRepository::new(db.pool().clone());

        let campaign = create_test_campaign();
        let day0 = create_test_message(&campaign, 0);
        let day1 = create_test_message(&campaign, 1);
        let day3 = create_test_message(&campaign, 3);
        let day7 = create_test_message(&campaign, 7);
        seed(
            &db,
            &campaign,
            &[day0.clone(), day1.clone(), day3.clone(), day7.clone()],
        )
        .await;

        repo.mark_sent(day0.id).await.unwrap();
        repo.mark_delivered(day1.id).await.unwrap();
        repo.mark_failed(day3.id, "bad number").await.unwrap();

        let rollup = repo
            .rollup_for_campaign(campaign.id, Utc::now())
            .await
            .unwrap();
        assert_eq!(rollup.total, 4);
        assert_eq!(rollup.sent, 2);
        assert_eq!(rollup.delivered, 1);
        assert_eq!(rollup.failed, 1);
        assert!(rollup.last_sent_at.is_some());
        assert_eq!(rollup.next_scheduled, Some(day7.scheduled_for));
    }

    #[tokio::test]
    async fn test_rollup_for_campaign_without_messages() {
        let db = DatabasePool::in_memory().await.unwrap();
        let repo = ScheduledMessageRepository::new(db.pool().clone());

        let campaign = create_test_campaign();
        seed(&db, &campaign, &[]).await;

        let rollup = repo
            .rollup_for_campaign(campaign.id, Utc::now())
            .await
            .unwrap();
        assert_eq!(rollup.total, 0);
        assert_eq!(rollup.sent, 0);
        assert!(rollup.last_sent_at.is_none());
        assert!(rollup.next_scheduled.is_none());
    }

    #[tokio::test]
    async fn test_rollup_by_campaign_groups_rows() {
        let db = DatabasePool::in_memory().await.unwrap();
        let repo = ScheduledMessageRepository::new(db.pool().clone());

        let first = create_test_campaign();
        let second = create_test_campaign();
        seed(
            &db,
            &first,
            &[create_test_message(&first, 0), create_test_message(&first, 1)],
        )
        .await;
        seed(&db, &second, &[create_test_message(&second, 0)]).await;

        let rollups = repo.rollup_by_campaign(Utc::now()).await.unwrap();
        assert_eq!(rollups.len(), 2);
        let by_id: std::collections::HashMap<_, _> =
            rollups.into_iter().map(|r| (r.campaign_id, r)).collect();
        assert_eq!(by_id[&first.id].total, 2);
        assert_eq!(by_id[&second.id].total, 1);
    }
}
