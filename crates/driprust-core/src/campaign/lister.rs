//! Campaign Lister - Dashboard statistics, filtering, and pagination
//!
//! Send counts and completion rates are recomputed from the scheduled
//! message rows on every call, never read from campaign counters, so
//! the dashboard stays truthful even after partial failures.

use chrono::{DateTime, Utc};
use driprust_storage::db::DatabasePool;
use driprust_storage::models::Campaign;
use driprust_storage::repository::{
    CampaignMessageRollup, CampaignRepository, ScheduledMessageRepository,
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::manager::CampaignError;

/// Filter and page parameters for listing campaigns
#[derive(Debug, Clone)]
pub struct ListFilter {
    /// Exact status match, "all" or `None` disables the filter
    pub status: Option<String>,
    /// Case-insensitive substring match on the campaign name
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// One campaign row on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct CampaignOverview {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub total_contacts: i64,
    pub total_scheduled: i64,
    pub sent_messages: i64,
    pub delivered_messages: i64,
    pub failed_messages: i64,
    pub replies: i64,
    pub completion_rate: f64,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_scheduled_message: Option<DateTime<Utc>>,
}

/// Page bookkeeping for a filtered listing
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// Dashboard totals over every campaign, ignoring the active filter
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_campaigns: i64,
    pub active_campaigns: i64,
    pub total_contacts: i64,
    pub total_sent: i64,
    pub total_replies: i64,
    pub reply_rate: f64,
}

/// A filtered, paginated campaign listing with dashboard totals
#[derive(Debug, Clone, Serialize)]
pub struct CampaignListPage {
    pub campaigns: Vec<CampaignOverview>,
    pub pagination: PageInfo,
    pub summary: DashboardSummary,
}

/// Campaign Lister - Builds dashboard views over stored campaigns
pub struct CampaignLister {
    campaign_repo: CampaignRepository,
    message_repo: ScheduledMessageRepository,
}

impl CampaignLister {
    /// Create a new campaign lister
    pub fn new(db_pool: DatabasePool) -> Self {
        Self {
            campaign_repo: CampaignRepository::new(db_pool.pool().clone()),
            message_repo: ScheduledMessageRepository::new(db_pool.pool().clone()),
        }
    }

    /// List campaigns with filtering and pagination
    ///
    /// The summary always covers the full campaign set. Filters narrow
    /// the rows and the pagination total only.
    pub async fn list(&self, filter: &ListFilter) -> Result<CampaignListPage, CampaignError> {
        let campaigns = self.campaign_repo.list_all().await?;
        let now = Utc::now();
        let rollups: HashMap<Uuid, CampaignMessageRollup> = self
            .message_repo
            .rollup_by_campaign(now)
            .await?
            .into_iter()
            .map(|r| (r.campaign_id, r))
            .collect();

        let all: Vec<CampaignOverview> = campaigns
            .iter()
            .map(|c| {
                let rollup = rollups.get(&c.id).cloned().unwrap_or_default();
                build_overview(c, &rollup)
            })
            .collect();

        let summary = summarize(&all);

        let mut filtered: Vec<CampaignOverview> = all
            .into_iter()
            .filter(|c| match filter.status.as_deref() {
                Some("all") | None => true,
                Some(status) => c.status == status,
            })
            .filter(|c| match filter.search.as_deref() {
                Some(needle) => c.name.to_lowercase().contains(&needle.to_lowercase()),
                None => true,
            })
            .collect();

        // Stable sort, so equal activity keeps the newest-first order
        // from the repository.
        filtered.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

        let total = filtered.len() as i64;
        let campaigns: Vec<CampaignOverview> = filtered
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();

        Ok(CampaignListPage {
            campaigns,
            pagination: PageInfo {
                total,
                limit: filter.limit,
                offset: filter.offset,
                has_more: filter.offset + filter.limit < total,
            },
            summary,
        })
    }

    /// Get the dashboard overview for a single campaign
    pub async fn get(&self, id: Uuid) -> Result<CampaignOverview, CampaignError> {
        let campaign = self
            .campaign_repo
            .get(id)
            .await?
            .ok_or(CampaignError::NotFound)?;
        let rollup = self.message_repo.rollup_for_campaign(id, Utc::now()).await?;
        Ok(build_overview(&campaign, &rollup))
    }
}

fn build_overview(campaign: &Campaign, rollup: &CampaignMessageRollup) -> CampaignOverview {
    let completion_rate = if rollup.total == 0 {
        0.0
    } else {
        rollup.sent as f64 / rollup.total as f64 * 100.0
    };

    CampaignOverview {
        id: campaign.id,
        name: campaign.name.clone(),
        status: campaign.status.clone(),
        total_contacts: campaign.total_contacts,
        total_scheduled: rollup.total,
        sent_messages: rollup.sent,
        delivered_messages: rollup.delivered,
        failed_messages: rollup.failed,
        replies: campaign.replies,
        completion_rate,
        created_at: campaign.created_at,
        last_activity: rollup.last_sent_at.unwrap_or(campaign.created_at),
        next_scheduled_message: rollup.next_scheduled,
    }
}

fn summarize(all: &[CampaignOverview]) -> DashboardSummary {
    let total_sent: i64 = all.iter().map(|c| c.sent_messages).sum();
    let total_replies: i64 = all.iter().map(|c| c.replies).sum();
    let reply_rate = if total_sent == 0 {
        0.0
    } else {
        total_replies as f64 / total_sent as f64 * 100.0
    };

    DashboardSummary {
        total_campaigns: all.len() as i64,
        active_campaigns: all.iter().filter(|c| c.status == "active").count() as i64,
        total_contacts: all.iter().map(|c| c.total_contacts).sum(),
        total_sent,
        total_replies,
        reply_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::manager::CampaignManager;
    use driprust_storage::models::{Contact, CreateCampaign, MessageTemplate};
    use serde_json::json;

    fn create_test_input(name: &str) -> CreateCampaign {
        CreateCampaign {
            name: name.to_string(),
            templates: vec![
                MessageTemplate {
                    day_offset: 0,
                    body: "Hi {name}!".to_string(),
                    active: true,
                },
                MessageTemplate {
                    day_offset: 7,
                    body: "Checking in, {name}".to_string(),
                    active: true,
                },
            ],
            contacts: vec![
                serde_json::from_value::<Contact>(json!({"phone": "+15550000001", "name": "Al"}))
                    .unwrap(),
                serde_json::from_value::<Contact>(json!({"phone": "+15550000002", "name": "Bo"}))
                    .unwrap(),
            ],
        }
    }

    #[tokio::test]
    async fn test_overview_recomputes_from_messages() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());
        let message_repo = ScheduledMessageRepository::new(db.pool().clone());

        let (campaign, messages) = manager
            .create_campaign(create_test_input("Spring Sale"))
            .await
            .unwrap();
        message_repo.mark_sent(messages[0].id).await.unwrap();
        message_repo.mark_delivered(messages[2].id).await.unwrap();

        let overview = lister.get(campaign.id).await.unwrap();
        assert_eq!(overview.total_scheduled, 4);
        assert_eq!(overview.sent_messages, 2);
        assert_eq!(overview.delivered_messages, 1);
        assert_eq!(overview.completion_rate, 50.0);
        // Day 7 messages are still pending for both contacts.
        assert_eq!(
            overview.next_scheduled_message,
            Some(messages[1].scheduled_for)
        );
        assert!(overview.last_activity > campaign.created_at);
    }

    #[tokio::test]
    async fn test_overview_without_sends_uses_creation_time() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());

        let (campaign, _) = manager
            .create_campaign(create_test_input("Quiet"))
            .await
            .unwrap();

        let overview = lister.get(campaign.id).await.unwrap();
        assert_eq!(overview.sent_messages, 0);
        assert_eq!(overview.completion_rate, 0.0);
        assert_eq!(overview.last_activity, campaign.created_at);
    }

    #[tokio::test]
    async fn test_filter_by_status_keeps_summary_unfiltered() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());

        let (_spring, _) = manager
            .create_campaign(create_test_input("Spring Sale"))
            .await
            .unwrap();
        let (winter, _) = manager
            .create_campaign(create_test_input("Winter Promo"))
            .await
            .unwrap();
        manager.pause_campaign(winter.id).await.unwrap();

        let page = lister
            .list(&ListFilter {
                status: Some("active".to_string()),
                ..ListFilter::default()
            })
            .await
            .unwrap();

        assert_eq!(page.campaigns.len(), 1);
        assert_eq!(page.campaigns[0].name, "Spring Sale");
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.summary.total_campaigns, 2);
        assert_eq!(page.summary.active_campaigns, 1);
        assert_eq!(page.summary.total_contacts, 4);

        let all = lister
            .list(&ListFilter {
                status: Some("all".to_string()),
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(all.campaigns.len(), 2);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());

        manager
            .create_campaign(create_test_input("Spring Sale"))
            .await
            .unwrap();
        manager
            .create_campaign(create_test_input("Winter Promo"))
            .await
            .unwrap();

        let page = lister
            .list(&ListFilter {
                search: Some("SPRING".to_string()),
                ..ListFilter::default()
            })
            .await
            .unwrap();

        assert_eq!(page.campaigns.len(), 1);
        assert_eq!(page.campaigns[0].name, "Spring Sale");
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());

        for name in ["One", "Two", "Three"] {
            manager.create_campaign(create_test_input(name)).await.unwrap();
        }

        let first = lister
            .list(&ListFilter {
                limit: 2,
                offset: 0,
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(first.campaigns.len(), 2);
        assert_eq!(first.pagination.total, 3);
        assert!(first.pagination.has_more);

        let rest = lister
            .list(&ListFilter {
                limit: 2,
                offset: 2,
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(rest.campaigns.len(), 1);
        assert!(!rest.pagination.has_more);
    }

    #[tokio::test]
    async fn test_recent_send_floats_campaign_to_top() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());
        let message_repo = ScheduledMessageRepository::new(db.pool().clone());

        let (older, older_messages) = manager
            .create_campaign(create_test_input("Older"))
            .await
            .unwrap();
        manager.create_campaign(create_test_input("Newer")).await.unwrap();

        // A fresh send on the older campaign beats the newer one's
        // creation time.
        message_repo.mark_sent(older_messages[0].id).await.unwrap();

        let page = lister.list(&ListFilter::default()).await.unwrap();
        assert_eq!(page.campaigns[0].id, older.id);
        assert_eq!(page.campaigns[1].name, "Newer");
    }

    #[tokio::test]
    async fn test_summary_reply_rate() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());
        let message_repo = ScheduledMessageRepository::new(db.pool().clone());
        let campaign_repo = CampaignRepository::new(db.pool().clone());

        let (campaign, messages) = manager
            .create_campaign(create_test_input("Replies"))
            .await
            .unwrap();
        message_repo.mark_sent(messages[0].id).await.unwrap();
        message_repo.mark_sent(messages[1].id).await.unwrap();
        campaign_repo.increment_replies(campaign.id, 1).await.unwrap();

        let page = lister.list(&ListFilter::default()).await.unwrap();
        assert_eq!(page.summary.total_sent, 2);
        assert_eq!(page.summary.total_replies, 1);
        assert_eq!(page.summary.reply_rate, 50.0);
    }

    #[tokio::test]
    async fn test_repeated_listing_is_stable() {
        let db = DatabasePool::in_memory().await.unwrap();
        let manager = CampaignManager::new(db.clone());
        let lister = CampaignLister::new(db.clone());
        let message_repo = ScheduledMessageRepository::new(db.pool().clone());

        let (_, messages) = manager
            .create_campaign(create_test_input("Stable"))
            .await
            .unwrap();
        message_repo.mark_sent(messages[0].id).await.unwrap();

        let first = lister.list(&ListFilter::default()).await.unwrap();
        let second = lister.list(&ListFilter::default()).await.unwrap();

        // Reads recompute from the same rows and never write back.
        assert_eq!(
            first.campaigns[0].sent_messages,
            second.campaigns[0].sent_messages
        );
        assert_eq!(
            first.campaigns[0].completion_rate,
            second.campaigns[0].completion_rate
        );
        assert_eq!(first.summary.total_sent, second.summary.total_sent);
    }

    #[tokio::test]
    async fn test_get_unknown_campaign() {
        let db = DatabasePool::in_memory().await.unwrap();
        let lister = CampaignLister::new(db.clone());

        let err = lister.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CampaignError::NotFound));
    }
}
