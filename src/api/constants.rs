//! Endpoint paths and headers for the campaign backend

use crate::editor::ids::{CampaignId, PanelId};

/// Qualification catalog (questions with nested options)
pub const QUESTION_OPTIONS_PATH: &str = "survey/question-options";

/// Panel provider directory
pub const PANEL_PROVIDERS_PATH: &str = "panel-providers";

/// Campaign creation
pub const CAMPAIGNS_PATH: &str = "survey/campaigns";

pub const LANGUAGES_PATH: &str = "languages";
pub const COUNTRIES_PATH: &str = "countries";

/// Standard headers for backend requests
pub mod headers {
    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Correlation header attached to every request
    pub const X_CORRELATION_ID: &str = "X-Correlation-ID";

    pub const USER_AGENT: &str = "panel-console/0.1";
}

/// HTTP methods issued by the gateway
pub mod methods {
    pub const GET: &str = "GET";
    pub const POST: &str = "POST";
    pub const PUT: &str = "PUT";
    pub const DELETE: &str = "DELETE";
}

/// Join the configured base URL and an endpoint path
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Saved panel with its qualifications and quotas (edit mode)
pub fn panel_detail_path(campaign_id: CampaignId, panel_id: PanelId) -> String {
    format!("campaign/{}/panel/{}/final-get", campaign_id, panel_id)
}

pub fn panel_create_path(campaign_id: CampaignId) -> String {
    format!("{}/{}/final-submit", CAMPAIGNS_PATH, campaign_id)
}

pub fn panel_update_path(campaign_id: CampaignId, panel_id: PanelId) -> String {
    format!("{}/{}/panels/{}/final-update", CAMPAIGNS_PATH, campaign_id, panel_id)
}

pub fn panel_delete_path(campaign_id: CampaignId, panel_id: PanelId) -> String {
    format!("{}/{}/panels/{}/final-delete", CAMPAIGNS_PATH, campaign_id, panel_id)
}
