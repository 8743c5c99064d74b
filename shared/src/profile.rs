//! Health profile normalization
//!
//! Turns a [`RawProfileForm`] into the canonical, immutable [`HealthProfile`]
//! consumed by recommendation generation and document export.
//!
//! The blood-pressure and cholesterol indicators are each stored as exactly
//! one representation: the discrete level, or the exact readings when the
//! form's advanced-mode flag is set. Readings entered while the flag is off
//! are dropped.

use crate::form::{FormNumber, RawProfileForm};
use crate::health_metrics::{calculate_bmi_result, ActivityLevel, Bmi, Gender};
use crate::validation::{first_violation, validate_name, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Systolic pressure above which blood pressure counts as high (mmHg)
pub const HIGH_SYSTOLIC_THRESHOLD: f64 = 130.0;
/// Total cholesterol above which cholesterol counts as high (mg/dL)
pub const HIGH_TOTAL_CHOLESTEROL_THRESHOLD: f64 = 200.0;

// ============================================================================
// Indicator Types
// ============================================================================

/// Discrete blood pressure level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BpLevel {
    Low,
    #[default]
    Normal,
    High,
}

impl BpLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BpLevel::Low => "Low",
            BpLevel::Normal => "Normal",
            BpLevel::High => "High",
        }
    }
}

impl FromStr for BpLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(BpLevel::Low),
            "normal" => Ok(BpLevel::Normal),
            "high" => Ok(BpLevel::High),
            _ => Err("Must be one of: Low, Normal, High".to_string()),
        }
    }
}

/// Discrete cholesterol level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CholesterolLevel {
    #[default]
    Normal,
    High,
}

impl CholesterolLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CholesterolLevel::Normal => "Normal",
            CholesterolLevel::High => "High",
        }
    }
}

impl FromStr for CholesterolLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(CholesterolLevel::Normal),
            "high" => Ok(CholesterolLevel::High),
            _ => Err("Must be one of: Normal, High".to_string()),
        }
    }
}

/// Exact blood pressure reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct BloodPressureReading {
    #[validate(range(min = 50.0, max = 300.0, message = "must be between 50 and 300 mmHg"))]
    pub systolic: f64,
    #[validate(range(min = 30.0, max = 200.0, message = "must be between 30 and 200 mmHg"))]
    pub diastolic: f64,
}

/// Exact cholesterol panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct CholesterolPanel {
    #[validate(range(min = 100.0, max = 500.0, message = "must be between 100 and 500 mg/dL"))]
    pub total: f64,
    #[validate(range(min = 0.0, max = 300.0, message = "must be between 0 and 300 mg/dL"))]
    pub ldl: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100 mg/dL"))]
    pub hdl: Option<f64>,
}

/// Blood pressure, as a level or as an exact reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BloodPressure {
    Level(BpLevel),
    Reading(BloodPressureReading),
}

impl BloodPressure {
    /// High when the level says so or systolic exceeds 130 mmHg
    pub fn is_high(&self) -> bool {
        match self {
            BloodPressure::Level(level) => *level == BpLevel::High,
            BloodPressure::Reading(reading) => reading.systolic > HIGH_SYSTOLIC_THRESHOLD,
        }
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BloodPressure::Level(level) => f.write_str(level.as_str()),
            BloodPressure::Reading(r) => write!(
                f,
                "{}/{} mmHg",
                format_measure(r.systolic),
                format_measure(r.diastolic)
            ),
        }
    }
}

/// Cholesterol, as a level or as an exact panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cholesterol {
    Level(CholesterolLevel),
    Panel(CholesterolPanel),
}

impl Cholesterol {
    /// High when the level says so or total exceeds 200 mg/dL
    pub fn is_high(&self) -> bool {
        match self {
            Cholesterol::Level(level) => *level == CholesterolLevel::High,
            Cholesterol::Panel(panel) => panel.total > HIGH_TOTAL_CHOLESTEROL_THRESHOLD,
        }
    }
}

impl fmt::Display for Cholesterol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cholesterol::Level(level) => f.write_str(level.as_str()),
            Cholesterol::Panel(panel) => {
                write!(f, "{} mg/dL", format_measure(panel.total))?;
                match (panel.ldl, panel.hdl) {
                    (Some(ldl), Some(hdl)) => write!(
                        f,
                        " (LDL {}, HDL {})",
                        format_measure(ldl),
                        format_measure(hdl)
                    ),
                    (Some(ldl), None) => write!(f, " (LDL {})", format_measure(ldl)),
                    (None, Some(hdl)) => write!(f, " (HDL {})", format_measure(hdl)),
                    (None, None) => Ok(()),
                }
            }
        }
    }
}

/// Glycemic readings in mg/dL
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseReadings {
    pub fasting: Option<f64>,
    pub post_meal: Option<f64>,
}

impl GlucoseReadings {
    pub fn has_readings(&self) -> bool {
        self.fasting.is_some() || self.post_meal.is_some()
    }
}

// ============================================================================
// Health Profile
// ============================================================================

/// Canonical health profile built once per form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: Bmi,
    pub blood_pressure: BloodPressure,
    pub cholesterol: Cholesterol,
    pub glucose: GlucoseReadings,
    pub allergies: Vec<String>,
    pub activity_level: ActivityLevel,
    pub available_ingredients: Option<String>,
    pub health_issues: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

impl HealthProfile {
    pub fn has_high_blood_pressure(&self) -> bool {
        self.blood_pressure.is_high()
    }

    pub fn has_high_cholesterol(&self) -> bool {
        self.cholesterol.is_high()
    }

    pub fn has_glycemic_readings(&self) -> bool {
        self.glucose.has_readings()
    }
}

/// Measurements that are checked on every submission
#[derive(Validate)]
struct Measurements {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    name: String,
    #[validate(range(min = 1.0, max = 120.0, message = "must be between 1 and 120"))]
    age: f64,
    #[validate(range(min = 50.0, max = 250.0, message = "must be between 50 and 250 cm"))]
    height_cm: f64,
    #[validate(range(min = 2.0, max = 300.0, message = "must be between 2 and 300 kg"))]
    weight_kg: f64,
    #[validate(range(min = 50.0, max = 300.0, message = "must be between 50 and 300 mg/dL"))]
    fasting_glucose: Option<f64>,
    #[validate(range(min = 70.0, max = 400.0, message = "must be between 70 and 400 mg/dL"))]
    post_meal_glucose: Option<f64>,
}

/// Normalize a form submission, stamping it with the current time
pub fn normalize(raw: &RawProfileForm) -> Result<HealthProfile, ValidationError> {
    normalize_at(raw, Utc::now())
}

/// Normalize a form submission into a [`HealthProfile`]
///
/// Fails on the first missing required field (name, age, gender, height,
/// weight), on any out-of-range measurement, and, in advanced mode, on
/// missing or out-of-range exact readings.
pub fn normalize_at(
    raw: &RawProfileForm,
    submitted_at: DateTime<Utc>,
) -> Result<HealthProfile, ValidationError> {
    let name = raw.name.as_deref().unwrap_or_default().trim().to_string();
    validate_name(&name).map_err(|msg| ValidationError::new("name", &msg))?;

    let age = required_number(&raw.age, "age")?;
    let gender = match non_blank(&raw.gender) {
        Some(text) => text
            .parse::<Gender>()
            .map_err(|msg| ValidationError::new("gender", &msg))?,
        None => return Err(ValidationError::required("gender")),
    };
    let height_cm = required_number(&raw.height, "height_cm")?;
    let weight_kg = required_number(&raw.weight, "weight_kg")?;

    let glucose = GlucoseReadings {
        fasting: optional_number(&raw.diabetes_fasting, "fasting_glucose")?,
        post_meal: optional_number(&raw.diabetes_post_meal, "post_meal_glucose")?,
    };

    Measurements {
        name: name.clone(),
        age,
        height_cm,
        weight_kg,
        fasting_glucose: glucose.fasting,
        post_meal_glucose: glucose.post_meal,
    }
    .validate()
    .map_err(|errors| first_violation(&errors))?;

    if age.fract() != 0.0 {
        return Err(ValidationError::new("age", "must be a whole number"));
    }

    let bmi = calculate_bmi_result(weight_kg, height_cm)
        .ok_or_else(|| ValidationError::new("weight_kg", "BMI cannot be calculated"))?;

    let blood_pressure = resolve_blood_pressure(raw)?;
    let cholesterol = resolve_cholesterol(raw)?;

    let activity_level = match non_blank(&raw.activity_level) {
        Some(text) => text
            .parse::<ActivityLevel>()
            .map_err(|msg| ValidationError::new("activity_level", &msg))?,
        None => ActivityLevel::default(),
    };

    Ok(HealthProfile {
        name,
        age: age as u32,
        gender,
        height_cm,
        weight_kg,
        bmi,
        blood_pressure,
        cholesterol,
        glucose,
        allergies: unique_entries(&raw.allergies),
        activity_level,
        available_ingredients: non_blank(&raw.available_ingredients).map(str::to_string),
        health_issues: unique_entries(&raw.health_issues),
        submitted_at,
    })
}

fn resolve_blood_pressure(raw: &RawProfileForm) -> Result<BloodPressure, ValidationError> {
    if raw.bp_advanced_mode {
        let reading = BloodPressureReading {
            systolic: required_number(&raw.systolic, "systolic")?,
            diastolic: required_number(&raw.diastolic, "diastolic")?,
        };
        reading.validate().map_err(|errors| first_violation(&errors))?;
        return Ok(BloodPressure::Reading(reading));
    }

    let level = match non_blank(&raw.bp_level) {
        Some(text) => text
            .parse::<BpLevel>()
            .map_err(|msg| ValidationError::new("bp_level", &msg))?,
        None => BpLevel::default(),
    };
    Ok(BloodPressure::Level(level))
}

fn resolve_cholesterol(raw: &RawProfileForm) -> Result<Cholesterol, ValidationError> {
    if raw.cholesterol_advanced_mode {
        let panel = CholesterolPanel {
            total: required_number(&raw.total_cholesterol, "total")?,
            ldl: optional_number(&raw.ldl, "ldl")?,
            hdl: optional_number(&raw.hdl, "hdl")?,
        };
        panel.validate().map_err(|errors| first_violation(&errors))?;
        return Ok(Cholesterol::Panel(panel));
    }

    let level = match non_blank(&raw.cholesterol_level) {
        Some(text) => text
            .parse::<CholesterolLevel>()
            .map_err(|msg| ValidationError::new("cholesterol_level", &msg))?,
        None => CholesterolLevel::default(),
    };
    Ok(Cholesterol::Level(level))
}

fn optional_number(value: &Option<FormNumber>, field: &str) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(number) => number.parse(field),
        None => Ok(None),
    }
}

fn required_number(value: &Option<FormNumber>, field: &str) -> Result<f64, ValidationError> {
    optional_number(value, field)?.ok_or_else(|| ValidationError::required(field))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Trim entries, drop blanks, and keep the first spelling of duplicates
fn unique_entries(entries: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
        if !unique.iter().any(|seen| seen.eq_ignore_ascii_case(entry)) {
            unique.push(entry.to_string());
        }
    }
    unique
}

/// Format a measurement without a trailing ".0"
pub fn format_measure(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
