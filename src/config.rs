use crate::editor::ids::{read_id, CampaignId};
use crate::editor::AllocationMode;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "PANEL_CONSOLE_BASE_URL";
pub const ENV_API_TOKEN: &str = "PANEL_CONSOLE_API_TOKEN";
pub const ENV_CAMPAIGN_ID: &str = "PANEL_CONSOLE_CAMPAIGN_ID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Campaign panel commands work on unless one is given explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<CampaignId>,
    #[serde(default)]
    pub allocation_mode: AllocationMode,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            campaign_id: None,
            allocation_mode: AllocationMode::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("panel-console")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".panel-console")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, then apply `.env` and environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using default config");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded config for backend {}", config.base_url);
        Ok(config)
    }

    /// Overlay values from a variable lookup, normally the process environment
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            debug!("Base URL overridden by {}", ENV_BASE_URL);
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(raw) = lookup(ENV_CAMPAIGN_ID) {
            match read_id(&raw) {
                Some(id) => self.campaign_id = Some(id),
                None => warn!("Ignoring {}='{}': not a campaign id", ENV_CAMPAIGN_ID, raw),
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        debug!("Saving config to: {:?}", config_path);

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn set_campaign(&mut self, campaign_id: CampaignId) {
        info!("Setting current campaign to: {}", campaign_id);
        self.campaign_id = Some(campaign_id);
    }

    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        let trimmed = base_url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            anyhow::bail!("Base URL must start with http:// or https://, got '{}'", base_url);
        }
        info!("Setting backend base URL to: {}", trimmed);
        self.base_url = trimmed.to_string();
        Ok(())
    }

    /// Campaign to work on: the explicit one, else the configured one
    pub fn resolve_campaign(&self, explicit: Option<CampaignId>) -> Result<CampaignId> {
        explicit.or(self.campaign_id).context(
            "No campaign selected. Pass --campaign or run `panel-console campaign use <ID>`",
        )
    }
}
