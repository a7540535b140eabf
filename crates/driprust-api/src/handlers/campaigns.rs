//! Campaign handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use driprust_core::{
    BatchReport, BatchSender, CampaignError, CampaignLister, CampaignListPage, CampaignManager,
    CampaignOverview, ListFilter,
};
use driprust_storage::models::{Campaign, Contact, CreateCampaign, MessageTemplate, ScheduledMessage};
use driprust_storage::repository::ScheduledMessageRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::state::AppState;

/// Error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for listing campaigns
#[derive(Debug, Deserialize)]
pub struct ListCampaignsQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Query parameters for listing messages
#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Campaign response
#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub total_contacts: i64,
    pub sent_messages: i64,
    pub delivered_messages: i64,
    pub failed_messages: i64,
    pub replies: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(c: Campaign) -> Self {
        Self {
            id: c.id,
            name: c.name,
            status: c.status,
            total_contacts: c.total_contacts,
            sent_messages: c.sent_messages,
            delivered_messages: c.delivered_messages,
            failed_messages: c.failed_messages,
            replies: c.replies,
            created_at: c.created_at,
            last_activity: c.last_activity,
        }
    }
}

/// Request body for creating a campaign
#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub templates: Vec<MessageTemplate>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// Response body for a created campaign
#[derive(Debug, Serialize)]
pub struct CreateCampaignResponse {
    pub campaign: CampaignResponse,
    pub scheduled_count: usize,
}

/// Scheduled message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub contact_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    pub message_text: String,
    pub template_day_offset: i64,
    pub scheduled_for: DateTime<Utc>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<ScheduledMessage> for MessageResponse {
    fn from(m: ScheduledMessage) -> Self {
        Self {
            id: m.id,
            contact_phone: m.contact_phone,
            contact_name: m.contact_name,
            message_text: m.message_text,
            template_day_offset: m.template_day_offset,
            scheduled_for: m.scheduled_for,
            status: m.status,
            sent_at: m.sent_at,
            last_error: m.last_error,
        }
    }
}

/// Message list response
#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub data: Vec<MessageResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Request body for an ad-hoc batch send
#[derive(Debug, Deserialize)]
pub struct SendBatchRequest {
    pub message: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

fn error_response(e: &CampaignError, fallback: &str) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = if e.is_validation() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        match e {
            CampaignError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
            CampaignError::NotActive | CampaignError::NotPaused => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, fallback.to_string()),
        }
    };
    (status, Json(ErrorResponse { error: message }))
}

/// Create a campaign and its message schedule
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CreateCampaignResponse>), (StatusCode, Json<ErrorResponse>)> {
    let manager = CampaignManager::new(state.db_pool.clone());

    let (campaign, messages) = manager
        .create_campaign(CreateCampaign {
            name: input.name,
            templates: input.templates,
            contacts: input.contacts,
        })
        .await
        .map_err(|e| {
            error!("Failed to create campaign: {}", e);
            error_response(&e, "Failed to create campaign")
        })?;

    info!("Created campaign {}", campaign.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateCampaignResponse {
            scheduled_count: messages.len(),
            campaign: CampaignResponse::from(campaign),
        }),
    ))
}

/// List campaigns with dashboard statistics
pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<CampaignListPage>, (StatusCode, Json<ErrorResponse>)> {
    let lister = CampaignLister::new(state.db_pool.clone());

    let page = lister
        .list(&ListFilter {
            status: query.status,
            search: query.search,
            limit: query.limit,
            offset: query.offset,
        })
        .await
        .map_err(|e| {
            error!("Failed to list campaigns: {}", e);
            error_response(&e, "Failed to list campaigns")
        })?;

    Ok(Json(page))
}

/// Get one campaign's dashboard overview
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignOverview>, (StatusCode, Json<ErrorResponse>)> {
    let lister = CampaignLister::new(state.db_pool.clone());

    let overview = lister.get(campaign_id).await.map_err(|e| {
        error!("Failed to get campaign {}: {}", campaign_id, e);
        error_response(&e, "Failed to get campaign")
    })?;

    Ok(Json(overview))
}

/// List a campaign's scheduled messages
pub async fn list_campaign_messages(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<Uuid>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<MessageListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let manager = CampaignManager::new(state.db_pool.clone());
    manager.get_campaign(campaign_id).await.map_err(|e| {
        error!("Failed to get campaign {}: {}", campaign_id, e);
        error_response(&e, "Failed to list messages")
    })?;

    let repo = ScheduledMessageRepository::new(state.db_pool.pool().clone());

    let messages = repo
        .list_by_campaign(campaign_id, query.limit, query.offset)
        .await
        .map_err(|e| {
            error!("Failed to list messages: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list messages".to_string(),
                }),
            )
        })?;

    let total = repo.count_by_campaign(campaign_id).await.map_err(|e| {
        error!("Failed to count messages: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to list messages".to_string(),
            }),
        )
    })?;

    Ok(Json(MessageListResponse {
        data: messages.into_iter().map(MessageResponse::from).collect(),
        total,
        limit: query.limit,
        offset: query.offset,
    }))
}

/// Pause an active campaign
pub async fn pause_campaign(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignResponse>, (StatusCode, Json<ErrorResponse>)> {
    let manager = CampaignManager::new(state.db_pool.clone());

    let campaign = manager.pause_campaign(campaign_id).await.map_err(|e| {
        error!("Failed to pause campaign {}: {}", campaign_id, e);
        error_response(&e, "Failed to pause campaign")
    })?;

    info!("Paused campaign {}", campaign_id);

    Ok(Json(CampaignResponse::from(campaign)))
}

/// Resume a paused campaign
pub async fn resume_campaign(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignResponse>, (StatusCode, Json<ErrorResponse>)> {
    let manager = CampaignManager::new(state.db_pool.clone());

    let campaign = manager.resume_campaign(campaign_id).await.map_err(|e| {
        error!("Failed to resume campaign {}: {}", campaign_id, e);
        error_response(&e, "Failed to resume campaign")
    })?;

    info!("Resumed campaign {}", campaign_id);

    Ok(Json(CampaignResponse::from(campaign)))
}

/// Send an ad-hoc batch for a campaign
///
/// Always returns 200 with a per-contact report once the campaign is
/// known. Individual send failures land in the report, never in the
/// response status.
pub async fn send_batch(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<Uuid>,
    Json(input): Json<SendBatchRequest>,
) -> Result<Json<BatchReport>, (StatusCode, Json<ErrorResponse>)> {
    let manager = CampaignManager::new(state.db_pool.clone());
    manager.get_campaign(campaign_id).await.map_err(|e| {
        error!("Failed to get campaign {}: {}", campaign_id, e);
        error_response(&e, "Failed to send batch")
    })?;

    let sender = BatchSender::new(state.transport.clone()).with_send_delay(state.send_delay);
    let report = sender
        .send_batch(campaign_id, &input.message, &input.contacts)
        .await;

    info!(
        "Batch send for campaign {} finished: {} sent, {} failed",
        campaign_id, report.sent, report.failed
    );

    Ok(Json(report))
}
