//! Seam between the editors and the backend

use super::models::{
    ApiQuestion, CampaignCreated, CampaignSubmission, LookupItem, PanelSubmission, Provider,
    SavedPanel,
};
use crate::editor::ids::{CampaignId, PanelId};
use async_trait::async_trait;
use serde_json::Value;

/// Remote operations the console depends on.
///
/// `ApiClient` talks to the real backend; tests substitute an in-memory fake.
/// Every method issues exactly one request and never retries.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_question_catalog(&self) -> anyhow::Result<Vec<ApiQuestion>>;

    async fn fetch_providers(&self) -> anyhow::Result<Vec<Provider>>;

    async fn fetch_panel(&self, campaign_id: CampaignId, panel_id: PanelId) -> anyhow::Result<SavedPanel>;

    async fn create_panel(&self, campaign_id: CampaignId, submission: &PanelSubmission) -> anyhow::Result<Value>;

    async fn update_panel(
        &self,
        campaign_id: CampaignId,
        panel_id: PanelId,
        submission: &PanelSubmission,
    ) -> anyhow::Result<Value>;

    async fn delete_panel(&self, campaign_id: CampaignId, panel_id: PanelId) -> anyhow::Result<Value>;

    async fn fetch_languages(&self) -> anyhow::Result<Vec<LookupItem>>;

    async fn fetch_countries(&self) -> anyhow::Result<Vec<LookupItem>>;

    async fn create_campaign(&self, submission: &CampaignSubmission) -> anyhow::Result<CampaignCreated>;
}
