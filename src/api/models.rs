//! Wire types exchanged with the campaign backend

use crate::editor::ids::{
    de_id, de_opt_decimal, de_opt_id, CampaignId, OptionId, ProviderId, QuestionId,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Literal the backend uses for automatically allocated targets
pub const AUTO_TARGET: &str = "Auto";

/// Generic `{ "data": [...] }` response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "de_null_default")]
    pub data: Vec<T>,
}

/// Answer option as delivered by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiOption {
    #[serde(deserialize_with = "de_id")]
    pub opt_id: OptionId,
    #[serde(default)]
    pub option_value: String,
}

/// Question with its nested options as delivered by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiQuestion {
    #[serde(deserialize_with = "de_id")]
    pub qs_id: QuestionId,
    #[serde(default)]
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default = "Vec::new", deserialize_with = "de_null_default")]
    pub options: Vec<ApiOption>,
}

/// Panel provider entry. Fields beyond id and name are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(deserialize_with = "de_id")]
    pub id: ProviderId,
    #[serde(default, alias = "provider_name")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Target completes: a positive count or the automatic-allocation marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Count(u32),
    Auto,
}

impl Target {
    /// Parse a form value. Zero and negative counts are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case(AUTO_TARGET) {
            return Some(Target::Auto);
        }
        match trimmed.parse::<u32>() {
            Ok(count) if count > 0 => Some(Target::Count(count)),
            _ => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Target::Auto)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Count(count) => write!(f, "{}", count),
            Target::Auto => f.write_str(AUTO_TARGET),
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Target::Count(count) => serializer.serialize_u32(*count),
            Target::Auto => serializer.serialize_str(AUTO_TARGET),
        }
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => u32::try_from(n)
                .map(Target::Count)
                .map_err(|_| serde::de::Error::custom(format!("target {} out of range", n))),
            Raw::Text(text) => Target::parse(&text)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid target '{}'", text))),
        }
    }
}

/// Panel attributes collected by the provider step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelAttributes {
    pub panel_provider_id: Option<ProviderId>,
    pub target_completes: Option<Target>,
    pub cpi: Option<f64>,
    pub entry_url: String,
}

/// Qualification filter: a question and the option ids that qualify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualification {
    #[serde(deserialize_with = "de_id")]
    pub qs_id: QuestionId,
    #[serde(default = "Vec::new", deserialize_with = "de_null_default")]
    pub option_ids: Vec<OptionId>,
}

/// Quota condition; ids are `null` when the control was left empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub qs_id: Option<QuestionId>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub opt_id: Option<OptionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaRecord {
    #[serde(default)]
    pub quota_name: String,
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default = "Vec::new", deserialize_with = "de_null_default")]
    pub conditions: Vec<ConditionRecord>,
}

/// Body of the create and update panel requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSubmission {
    pub panel: PanelAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<Vec<Qualification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotas: Option<Vec<QuotaRecord>>,
    pub skip: bool,
}

impl PanelSubmission {
    pub fn full(panel: PanelAttributes, qualifications: Vec<Qualification>, quotas: Vec<QuotaRecord>) -> Self {
        Self {
            panel,
            qualifications: Some(qualifications),
            quotas: Some(quotas),
            skip: false,
        }
    }

    /// Panel attributes only, qualifications and quotas are left to the backend
    pub fn skipped(panel: PanelAttributes) -> Self {
        Self {
            panel,
            qualifications: None,
            quotas: None,
            skip: true,
        }
    }
}

/// `{ "panel": {...} }` envelope of the panel detail endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct PanelEnvelope {
    pub panel: SavedPanel,
}

/// Previously saved panel, used to seed the editor in edit mode
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedPanel {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub panel_provider_id: Option<ProviderId>,
    #[serde(default)]
    pub target_completes: Option<Target>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub cpi: Option<f64>,
    #[serde(default)]
    pub entry_url: Option<String>,
    #[serde(default = "Vec::new", deserialize_with = "de_null_default")]
    pub qualifications: Vec<Qualification>,
    #[serde(default = "Vec::new", deserialize_with = "de_null_default")]
    pub quotas: Vec<QuotaRecord>,
}

/// Language or country entry from the lookup endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupItem {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    #[serde(default, alias = "language_name", alias = "country_name")]
    pub name: String,
}

/// Body of the campaign creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSubmission {
    #[serde(rename = "campaignName")]
    pub campaign_name: String,
    pub country_id: Option<i64>,
    pub language_id: Option<i64>,
    pub loi: Option<u32>,
    pub ir: Option<u32>,
    pub total_completes: Option<u32>,
    pub allocation_mode: String,
    pub redirect_complete: Option<String>,
    pub redirect_terminate: Option<String>,
    pub redirect_overquota: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignCreated {
    #[serde(deserialize_with = "de_id")]
    pub campaign_id: CampaignId,
}

/// Treat an explicit `null` like a missing field
fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_parse() {
        assert_eq!(Target::parse("10"), Some(Target::Count(10)));
        assert_eq!(Target::parse("Auto"), Some(Target::Auto));
        assert_eq!(Target::parse("auto"), Some(Target::Auto));
        assert_eq!(Target::parse("0"), None);
        assert_eq!(Target::parse("-3"), None);
        assert_eq!(Target::parse("1.5"), None);
        assert_eq!(Target::parse(""), None);
    }

    #[test]
    fn test_target_wire_format() {
        assert_eq!(serde_json::to_value(Target::Count(25)).unwrap(), json!(25));
        assert_eq!(serde_json::to_value(Target::Auto).unwrap(), json!("Auto"));
        let parsed: Target = serde_json::from_value(json!("40")).unwrap();
        assert_eq!(parsed, Target::Count(40));
    }

    #[test]
    fn test_catalog_envelope_decodes() {
        let body = json!({
            "data": [
                {"qs_id": 1, "question": "Age", "type": "range",
                 "options": [{"opt_id": 1, "option_value": "18-24"}]},
                {"qs_id": 2, "question": "Gender", "type": "single", "options": null}
            ]
        });
        let envelope: DataEnvelope<ApiQuestion> = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[0].kind, "range");
        assert_eq!(envelope.data[0].options[0].option_value, "18-24");
        assert!(envelope.data[1].options.is_empty());
    }

    #[test]
    fn test_provider_keeps_extra_fields() {
        let provider: Provider = serde_json::from_value(json!({
            "id": "4", "provider_name": "Cint", "region": "Global"
        }))
        .unwrap();
        assert_eq!(provider.id, 4);
        assert_eq!(provider.name, "Cint");
        assert_eq!(provider.extra.get("region"), Some(&json!("Global")));
    }

    #[test]
    fn test_saved_panel_tolerates_nulls() {
        let envelope: PanelEnvelope = serde_json::from_value(json!({
            "panel": {
                "panel_provider_id": 2,
                "target_completes": 500,
                "cpi": "2.75",
                "entry_url": "https://survey.example.com/s?pid=[PID]",
                "qualifications": [{"qs_id": 1, "option_ids": [1, 2]}],
                "quotas": null
            }
        }))
        .unwrap();
        let panel = envelope.panel;
        assert_eq!(panel.panel_provider_id, Some(2));
        assert_eq!(panel.target_completes, Some(Target::Count(500)));
        assert_eq!(panel.cpi, Some(2.75));
        assert_eq!(panel.qualifications[0].option_ids, vec![1, 2]);
        assert!(panel.quotas.is_empty());
    }

    #[test]
    fn test_skipped_submission_omits_filters() {
        let submission = PanelSubmission::skipped(PanelAttributes {
            panel_provider_id: Some(1),
            target_completes: Some(Target::Auto),
            cpi: Some(1.25),
            entry_url: "https://e.example.com".to_string(),
        });
        let body = serde_json::to_value(&submission).unwrap();
        assert_eq!(body["skip"], json!(true));
        assert!(body.get("qualifications").is_none());
        assert!(body.get("quotas").is_none());
        assert_eq!(body["panel"]["target_completes"], json!("Auto"));
    }
}
