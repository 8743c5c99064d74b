//! Input validation functions
//!
//! This module provides validation utilities for the profile form.
//! Range checks are declared with the `validator` crate's derive macros on
//! the typed profile structs; this module turns their reports into a single
//! user-facing [`ValidationError`].

use thiserror::Error;

/// Validate that a name is present and not only whitespace
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("is required".to_string());
    }
    Ok(())
}

/// Validate that a number is usable at all
pub fn validate_finite(value: f64) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err("must be a valid number".to_string());
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Order in which field problems are reported when several fail at once
const FIELD_ORDER: &[&str] = &[
    "name",
    "age",
    "gender",
    "height_cm",
    "weight_kg",
    "fasting_glucose",
    "post_meal_glucose",
    "bp_level",
    "systolic",
    "diastolic",
    "cholesterol_level",
    "total",
    "ldl",
    "hdl",
    "activity_level",
];

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "name" => "Name",
        "age" => "Age",
        "gender" => "Gender",
        "height" | "height_cm" => "Height",
        "weight" | "weight_kg" => "Weight",
        "fasting_glucose" | "diabetes_fasting" => "Fasting Glucose",
        "post_meal_glucose" | "diabetes_post_meal" => "Post-Meal Glucose",
        "bp_level" => "Blood Pressure Level",
        "systolic" => "Systolic",
        "diastolic" => "Diastolic",
        "cholesterol_level" => "Cholesterol Level",
        "total" | "total_cholesterol" => "Total Cholesterol",
        "ldl" => "LDL",
        "hdl" => "HDL",
        "activity_level" => "Activity Level",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{display_label}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Error for a required field that was left empty
    pub fn required(field: &str) -> Self {
        Self::new(field, "is required")
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Pick the first failing field of a `validator` report
///
/// `validator` reports field errors in a hash map, so the winner is chosen by
/// form order to keep the message stable between runs.
pub fn first_violation(errors: &validator::ValidationErrors) -> ValidationError {
    let mut violations: Vec<(usize, ValidationError)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let field: &str = field.as_ref();
            let err = errs.first()?;
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("is invalid ({})", err.code));
            let rank = FIELD_ORDER
                .iter()
                .position(|f| *f == field)
                .unwrap_or(FIELD_ORDER.len());
            Some((rank, ValidationError::new(field, &message)))
        })
        .collect();

    violations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.field.cmp(&b.1.field)));
    violations
        .into_iter()
        .next()
        .map(|(_, err)| err)
        .unwrap_or_else(|| ValidationError::new("form", "is invalid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1, max = 120, message = "must be between 1 and 120"))]
        age: u32,
        #[validate(range(min = 50.0, max = 300.0, message = "must be between 50 and 300 mmHg"))]
        systolic: f64,
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Asha").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite(70.0).is_ok());
        assert!(validate_finite(f64::NAN).is_err());
        assert!(validate_finite(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_field_display_labels() {
        assert_eq!(get_field_display_label("height_cm"), "Height");
        assert_eq!(get_field_display_label("total"), "Total Cholesterol");
        assert_eq!(get_field_display_label("post_meal_glucose"), "Post-Meal Glucose");
        assert_eq!(get_field_display_label("unknown_field"), "unknown_field");
    }

    #[test]
    fn test_validation_error() {
        let err = ValidationError::new("systolic", "must be between 50 and 300 mmHg");
        assert_eq!(err.field, "systolic");
        assert_eq!(err.display_label, "Systolic");
        assert_eq!(err.user_message(), "Systolic: must be between 50 and 300 mmHg");
        assert_eq!(ValidationError::required("age").user_message(), "Age: is required");
    }

    #[test]
    fn test_first_violation_follows_form_order() {
        let sample = Sample {
            age: 0,
            systolic: 301.0,
        };
        let errors = sample.validate().unwrap_err();
        let err = first_violation(&errors);
        assert_eq!(err.field, "age");
        assert_eq!(err.message, "must be between 1 and 120");
    }

    #[test]
    fn test_first_violation_single_field() {
        let sample = Sample {
            age: 30,
            systolic: 301.0,
        };
        let err = first_violation(&sample.validate().unwrap_err());
        assert_eq!(err.field, "systolic");
        assert_eq!(err.display_label, "Systolic");
    }
}
