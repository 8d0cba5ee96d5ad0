use super::constants::{self, headers, methods};
use super::gateway::Gateway;
use super::models::{
    ApiQuestion, CampaignCreated, CampaignSubmission, DataEnvelope, LookupItem, PanelEnvelope,
    PanelSubmission, Provider, SavedPanel,
};
use crate::config::Config;
use crate::editor::ids::{CampaignId, PanelId};
use anyhow::Context;
use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};

/// HTTP client for the campaign backend with connection pooling
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: reqwest::Client,
    api_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(headers::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_custom_client(base_url, http_client))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_custom_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            api_token: None,
        }
    }

    /// Build a client from the loaded configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut client = Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        client.api_token = config.api_token.clone();
        Ok(client)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let value = self.send(methods::GET, path, None::<&()>).await?;
        decode(path, value)
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(methods::POST, path, Some(body)).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(methods::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(methods::DELETE, path, None::<&()>).await
    }

    /// Issue one request and return the JSON body (`Null` for empty bodies).
    ///
    /// Non-2xx responses become errors carrying the status and response text.
    async fn send<B: Serialize + ?Sized>(&self, method: &str, path: &str, body: Option<&B>) -> anyhow::Result<Value> {
        let url = constants::endpoint_url(&self.base_url, path);
        let correlation_id = uuid::Uuid::new_v4().to_string();

        let mut request = match method {
            methods::GET => self.http_client.get(&url),
            methods::POST => self.http_client.post(&url),
            methods::PUT => self.http_client.put(&url),
            methods::DELETE => self.http_client.delete(&url),
            other => anyhow::bail!("Unsupported HTTP method: {}", other),
        };

        request = request
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .header(headers::X_CORRELATION_ID, &correlation_id);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {} [{}]", method, url, correlation_id);
        let started = Instant::now();
        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed to send", method, path))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("{} {} failed to read response body", method, path))?;
        debug!(
            "{} {} -> {} in {}ms [{}]",
            method,
            path,
            status.as_u16(),
            started.elapsed().as_millis(),
            correlation_id
        );

        if !status.is_success() {
            warn!("{} {} returned {}: {}", method, path, status.as_u16(), text);
            anyhow::bail!("{} {} failed with status {}: {}", method, path, status.as_u16(), text);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => Ok(json),
            Err(_) => Ok(Value::String(text)),
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> anyhow::Result<T> {
    serde_json::from_value(value).with_context(|| format!("Unexpected response shape from {}", path))
}

#[async_trait]
impl Gateway for ApiClient {
    async fn fetch_question_catalog(&self) -> anyhow::Result<Vec<ApiQuestion>> {
        let envelope: DataEnvelope<ApiQuestion> = self.get_json(constants::QUESTION_OPTIONS_PATH).await?;
        Ok(envelope.data)
    }

    async fn fetch_providers(&self) -> anyhow::Result<Vec<Provider>> {
        let envelope: DataEnvelope<Provider> = self.get_json(constants::PANEL_PROVIDERS_PATH).await?;
        Ok(envelope.data)
    }

    async fn fetch_panel(&self, campaign_id: CampaignId, panel_id: PanelId) -> anyhow::Result<SavedPanel> {
        let path = constants::panel_detail_path(campaign_id, panel_id);
        let envelope: PanelEnvelope = self.get_json(&path).await?;
        Ok(envelope.panel)
    }

    async fn create_panel(&self, campaign_id: CampaignId, submission: &PanelSubmission) -> anyhow::Result<Value> {
        self.post_json(&constants::panel_create_path(campaign_id), submission).await
    }

    async fn update_panel(
        &self,
        campaign_id: CampaignId,
        panel_id: PanelId,
        submission: &PanelSubmission,
    ) -> anyhow::Result<Value> {
        self.put_json(&constants::panel_update_path(campaign_id, panel_id), submission).await
    }

    async fn delete_panel(&self, campaign_id: CampaignId, panel_id: PanelId) -> anyhow::Result<Value> {
        self.delete(&constants::panel_delete_path(campaign_id, panel_id)).await
    }

    async fn fetch_languages(&self) -> anyhow::Result<Vec<LookupItem>> {
        let envelope: DataEnvelope<LookupItem> = self.get_json(constants::LANGUAGES_PATH).await?;
        Ok(envelope.data)
    }

    async fn fetch_countries(&self) -> anyhow::Result<Vec<LookupItem>> {
        let envelope: DataEnvelope<LookupItem> = self.get_json(constants::COUNTRIES_PATH).await?;
        Ok(envelope.data)
    }

    async fn create_campaign(&self, submission: &CampaignSubmission) -> anyhow::Result<CampaignCreated> {
        let value = self.post_json(constants::CAMPAIGNS_PATH, submission).await?;
        decode(constants::CAMPAIGNS_PATH, value)
    }
}
