//! DripRust Core - Campaign scheduling, personalization, and sending
//!
//! This crate provides the core campaign engine for DripRust,
//! including placeholder personalization, message scheduling, campaign
//! statistics, and batch SMS dispatch.

pub mod campaign;
pub mod send;

pub use campaign::{
    CampaignError, CampaignLister, CampaignListPage, CampaignManager, CampaignOverview,
    DashboardSummary, ListFilter, PageInfo, PersonalizationEngine,
};
pub use send::{BatchReport, BatchSender, ContactSendResult, SmsGatewayClient, SmsTransport, TransportError};
