//! Identifier coercion between the backend and form controls
//!
//! The backend speaks numeric identifiers while every dropdown in the editor
//! binds text. All conversions go through this module: `bind_id` when a value
//! is written into a control, `read_id` when a control value is read back.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

pub type QuestionId = i64;
pub type OptionId = i64;
pub type ProviderId = i64;
pub type CampaignId = i64;
pub type PanelId = i64;

/// Encode an identifier for a text-bound control
pub fn bind_id(id: i64) -> String {
    id.to_string()
}

/// Encode an optional identifier, absent ids bind as an empty control
pub fn bind_opt_id(id: Option<i64>) -> String {
    id.map(bind_id).unwrap_or_default()
}

/// Decode a control value back into an identifier.
///
/// Empty or non-numeric values decode to `None`.
pub fn read_id(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Compare a bound control value against an identifier
pub fn id_matches(value: &str, id: i64) -> bool {
    read_id(value) == Some(id)
}

/// Decode a text field holding a decimal amount
pub fn read_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Deserialize an identifier the backend may send as a number or a numeric string
pub fn de_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IdVisitor)
}

/// Optional variant of [`de_id`]; `null` and empty strings become `None`
pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(OptIdVisitor)
}

/// Deserialize an optional decimal sent as a number or a numeric string
pub fn de_opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(OptDecimalVisitor)
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer identifier or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("identifier {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        read_id(v).ok_or_else(|| E::custom(format!("invalid identifier '{}'", v)))
    }
}

struct OptIdVisitor;

impl<'de> Visitor<'de> for OptIdVisitor {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an optional integer identifier")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        IdVisitor.visit_u64(v).map(Some)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.trim().is_empty() {
            return Ok(None);
        }
        IdVisitor.visit_str(v).map(Some)
    }
}

struct OptDecimalVisitor;

impl<'de> Visitor<'de> for OptDecimalVisitor {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an optional decimal number")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.trim().is_empty() {
            return Ok(None);
        }
        read_decimal(v)
            .map(Some)
            .ok_or_else(|| E::custom(format!("invalid decimal '{}'", v)))
    }
}
