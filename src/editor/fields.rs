//! Text-bound form fields with touched tracking and validation rules

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Optional redirect URLs must look like http(s) links
pub static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://.*$").expect("static URL pattern compiles"));

/// Validation rule applied to a field's text value.
///
/// Apart from `Required`, rules pass on an empty value so optional fields
/// only validate what was entered.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Required,
    /// Numeric value must be at least this much
    Min(f64),
    Max(f64),
    /// Whole number, no decimals
    Integer,
    /// Non-negative whole number within the range of a completes count
    Count,
    MinLength(usize),
    MaxLength(usize),
    Pattern(&'static Lazy<Regex>),
}

/// Finite numbers only; `inf` and `NaN` parse as floats but are not amounts
fn read_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Rule {
    fn check(&self, label: &str, value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return match self {
                Rule::Required => Err(format!("{} is required", label)),
                _ => Ok(()),
            };
        }

        match self {
            Rule::Required => Ok(()),
            Rule::Min(min) => match read_number(trimmed) {
                Some(n) if n >= *min => Ok(()),
                Some(_) => Err(format!("{} must be at least {}", label, min)),
                None => Err(format!("{} must be a number", label)),
            },
            Rule::Max(max) => match read_number(trimmed) {
                Some(n) if n <= *max => Ok(()),
                Some(_) => Err(format!("{} must be at most {}", label, max)),
                None => Err(format!("{} must be a number", label)),
            },
            Rule::Integer => trimmed
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| format!("{} must be a whole number", label)),
            Rule::Count => trimmed
                .parse::<u32>()
                .map(|_| ())
                .map_err(|_| format!("{} must be a whole number up to {}", label, u32::MAX)),
            Rule::MinLength(len) if trimmed.chars().count() < *len => {
                Err(format!("{} must be at least {} characters", label, len))
            }
            Rule::MaxLength(len) if trimmed.chars().count() > *len => {
                Err(format!("{} must be at most {} characters", label, len))
            }
            Rule::MinLength(_) | Rule::MaxLength(_) => Ok(()),
            Rule::Pattern(pattern) if !pattern.is_match(trimmed) => {
                Err(format!("{} has an invalid format", label))
            }
            Rule::Pattern(_) => Ok(()),
        }
    }
}

/// A single text-bound control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
    value: String,
    touched: bool,
}

impl FormField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            touched: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    /// Clear the value and the touched flag
    pub fn reset(&mut self) {
        self.value.clear();
        self.touched = false;
    }

    /// First failing rule, if any
    pub fn validate(&self, field: &'static str, label: &str, rules: &[Rule]) -> Result<(), FieldError> {
        for rule in rules {
            rule.check(label, &self.value).map_err(|message| FieldError { field, message })?;
        }
        Ok(())
    }

    /// Validation error to display: only once the field has been touched
    pub fn visible_error(&self, field: &'static str, label: &str, rules: &[Rule]) -> Option<FieldError> {
        if !self.touched {
            return None;
        }
        self.validate(field, label, rules).err()
    }
}
