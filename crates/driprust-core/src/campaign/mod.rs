//! Campaign Module - Scheduling, personalization, and statistics

mod lister;
mod manager;
mod template;

pub use lister::{CampaignLister, CampaignListPage, CampaignOverview, DashboardSummary, ListFilter, PageInfo};
pub use manager::{CampaignError, CampaignManager};
pub use template::PersonalizationEngine;
