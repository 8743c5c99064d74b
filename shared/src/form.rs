//! Raw profile form input
//!
//! Browsers submit form fields as strings, API clients tend to send numbers.
//! [`RawProfileForm`] accepts both so the normalizer is the only place where
//! input is judged.

use crate::validation::{validate_finite, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};

/// A numeric form field as submitted: a JSON number or its text form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Number(f64),
    Text(String),
}

impl FormNumber {
    /// Parse the field; empty text counts as absent
    pub fn parse(&self, field: &str) -> Result<Option<f64>, ValidationError> {
        let value = match self {
            FormNumber::Number(n) => *n,
            FormNumber::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| ValidationError::new(field, "must be a number"))?
            }
        };

        validate_finite(value).map_err(|msg| ValidationError::new(field, &msg))?;
        Ok(Some(value))
    }
}

impl From<f64> for FormNumber {
    fn from(value: f64) -> Self {
        FormNumber::Number(value)
    }
}

impl From<&str> for FormNumber {
    fn from(value: &str) -> Self {
        FormNumber::Text(value.to_string())
    }
}

/// Untyped profile form submission
///
/// Field names follow the form's camelCase keys. Every field is optional at
/// this stage; requiredness is decided by [`crate::profile::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProfileForm {
    // Basic profile
    pub name: Option<String>,
    pub age: Option<FormNumber>,
    pub gender: Option<String>,
    pub height: Option<FormNumber>,
    pub weight: Option<FormNumber>,

    // Glycemic readings
    pub diabetes_fasting: Option<FormNumber>,
    pub diabetes_post_meal: Option<FormNumber>,

    #[serde(deserialize_with = "string_list")]
    pub allergies: Vec<String>,

    // Blood pressure
    pub bp_level: Option<String>,
    pub systolic: Option<FormNumber>,
    pub diastolic: Option<FormNumber>,
    #[serde(deserialize_with = "flag")]
    pub bp_advanced_mode: bool,

    // Cholesterol
    pub cholesterol_level: Option<String>,
    pub total_cholesterol: Option<FormNumber>,
    pub ldl: Option<FormNumber>,
    pub hdl: Option<FormNumber>,
    #[serde(deserialize_with = "flag")]
    pub cholesterol_advanced_mode: bool,

    // Lifestyle
    pub activity_level: Option<String>,
    pub available_ingredients: Option<String>,

    #[serde(deserialize_with = "string_list")]
    pub health_issues: Vec<String>,
}

/// Checkbox values arrive as booleans, "true"/"on" strings, or null
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "on" | "1" | "yes"),
        None => false,
    })
}

/// Lists arrive as arrays or as a single comma-separated string
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum List {
        Many(Vec<String>),
        One(String),
    }

    Ok(match Option::<List>::deserialize(deserializer)? {
        Some(List::Many(items)) => items,
        Some(List::One(joined)) => joined.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    })
}
