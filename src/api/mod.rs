//! Campaign backend access
//!
//! `Gateway` is the seam the editors talk to; `ApiClient` implements it over
//! HTTP. Requests are issued once, never retried.

pub mod client;
pub mod constants;
pub mod gateway;
pub mod models;

pub use client::ApiClient;
pub use gateway::Gateway;
pub use models::{
    ApiOption, ApiQuestion, CampaignCreated, CampaignSubmission, ConditionRecord, LookupItem,
    PanelAttributes, PanelSubmission, Provider, Qualification, QuotaRecord, SavedPanel, Target,
};
