//! In-memory backend shared by the integration tests

#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use panel_console::api::models::{
    ApiOption, ApiQuestion, CampaignCreated, CampaignSubmission, LookupItem, PanelSubmission,
    Provider, SavedPanel,
};
use panel_console::api::Gateway;
use serde_json::{json, Map, Value};
use std::sync::Mutex;

/// Request the fake received, with its body as sent on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreatePanel { campaign_id: i64, body: Value },
    UpdatePanel { campaign_id: i64, panel_id: i64, body: Value },
    DeletePanel { campaign_id: i64, panel_id: i64 },
    CreateCampaign { body: Value },
}

#[derive(Default)]
pub struct FakeGateway {
    pub catalog: Vec<ApiQuestion>,
    pub providers: Vec<Provider>,
    pub saved_panel: Option<SavedPanel>,
    pub languages: Vec<LookupItem>,
    pub countries: Vec<LookupItem>,
    pub fail_catalog: bool,
    pub fail_countries: bool,
    pub fail_submit: bool,
    pub calls: Mutex<Vec<Call>>,
}

fn question(id: i64, label: &str, kind: &str, options: &[(i64, &str)]) -> ApiQuestion {
    ApiQuestion {
        qs_id: id,
        question: label.to_string(),
        kind: kind.to_string(),
        options: options
            .iter()
            .map(|(opt_id, value)| ApiOption {
                opt_id: *opt_id,
                option_value: value.to_string(),
            })
            .collect(),
    }
}

impl FakeGateway {
    /// Two questions (Age, Gender) and one provider
    pub fn new() -> Self {
        Self {
            catalog: vec![
                question(1, "Age", "range", &[(1, "18-24"), (2, "25-34"), (3, "35-44")]),
                question(2, "Gender", "single", &[(5, "Female"), (6, "Male")]),
            ],
            providers: vec![Provider {
                id: 3,
                name: "Cint".to_string(),
                extra: Map::new(),
            }],
            languages: vec![LookupItem { id: 1, name: "English".to_string() }],
            countries: vec![LookupItem { id: 2, name: "Germany".to_string() }],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn submit_result(&self, path: String) -> anyhow::Result<Value> {
        if self.fail_submit {
            return Err(anyhow!("{} failed with status 500 Internal Server Error: boom", path));
        }
        Ok(json!({ "status": "ok" }))
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn fetch_question_catalog(&self) -> anyhow::Result<Vec<ApiQuestion>> {
        if self.fail_catalog {
            return Err(anyhow!("GET survey/question-options failed with status 503"));
        }
        Ok(self.catalog.clone())
    }

    async fn fetch_providers(&self) -> anyhow::Result<Vec<Provider>> {
        Ok(self.providers.clone())
    }

    async fn fetch_panel(&self, _campaign_id: i64, panel_id: i64) -> anyhow::Result<SavedPanel> {
        self.saved_panel
            .clone()
            .ok_or_else(|| anyhow!("panel {} not found", panel_id))
    }

    async fn create_panel(&self, campaign_id: i64, submission: &PanelSubmission) -> anyhow::Result<Value> {
        self.record(Call::CreatePanel {
            campaign_id,
            body: serde_json::to_value(submission)?,
        });
        self.submit_result(format!("POST survey/campaigns/{}/final-submit", campaign_id))
    }

    async fn update_panel(
        &self,
        campaign_id: i64,
        panel_id: i64,
        submission: &PanelSubmission,
    ) -> anyhow::Result<Value> {
        self.record(Call::UpdatePanel {
            campaign_id,
            panel_id,
            body: serde_json::to_value(submission)?,
        });
        self.submit_result(format!("PUT survey/campaigns/{}/panels/{}/final-update", campaign_id, panel_id))
    }

    async fn delete_panel(&self, campaign_id: i64, panel_id: i64) -> anyhow::Result<Value> {
        self.record(Call::DeletePanel { campaign_id, panel_id });
        self.submit_result(format!(
            "DELETE survey/campaigns/{}/panels/{}/final-delete",
            campaign_id, panel_id
        ))
    }

    async fn fetch_languages(&self) -> anyhow::Result<Vec<LookupItem>> {
        Ok(self.languages.clone())
    }

    async fn fetch_countries(&self) -> anyhow::Result<Vec<LookupItem>> {
        if self.fail_countries {
            return Err(anyhow!("GET countries failed with status 500"));
        }
        Ok(self.countries.clone())
    }

    async fn create_campaign(&self, submission: &CampaignSubmission) -> anyhow::Result<CampaignCreated> {
        self.record(Call::CreateCampaign {
            body: serde_json::to_value(submission)?,
        });
        Ok(CampaignCreated { campaign_id: 41 })
    }
}
