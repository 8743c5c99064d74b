//! Health metrics calculations module
//!
//! Provides the BMI calculation and classification used when a health
//! profile is normalized, plus the small enumerations (gender, activity
//! level) that describe the person the meal plan is built for.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Derived Only**: BMI is always computed from height and weight, never entered
//! 3. **Type Safety**: Strong typing prevents unit confusion

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Profile Enumerations
// ============================================================================

/// Gender as entered on the profile form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err("Must be one of: Male, Female, Other".to_string()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity level, used by the recommendation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Regular exercise
    Active,
    /// Training at a competitive level
    Athlete,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Active => "Active",
            ActivityLevel::Athlete => "Athlete",
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::Active => "Regular exercise several days a week",
            ActivityLevel::Athlete => "Intensive daily training",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "active" => Ok(ActivityLevel::Active),
            "athlete" => Ok(ActivityLevel::Athlete),
            _ => Err("Must be one of: Sedentary, Active, Athlete".to_string()),
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived BMI of a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bmi {
    /// BMI rounded to one decimal place
    pub value: f64,
    /// Category of the rounded value
    pub category: BmiCategory,
}

impl fmt::Display for Bmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ({})", self.value, self.category)
    }
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Round a BMI value to one decimal place
pub fn round_bmi(bmi: f64) -> f64 {
    (bmi * 10.0).round() / 10.0
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Calculate the rounded BMI and its category
///
/// Returns `None` when either measurement is non-positive or not a finite
/// number, in which case BMI is undefined.
pub fn calculate_bmi_result(weight_kg: f64, height_cm: f64) -> Option<Bmi> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(weight_kg) || !usable(height_cm) {
        return None;
    }

    let value = round_bmi(calculate_bmi(weight_kg, height_cm));
    Some(Bmi {
        value,
        category: classify_bmi(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    // =========================================================================
    // BMI Tests
    // =========================================================================

    #[test]
    fn test_bmi_calculation() {
        // 70kg, 175cm -> BMI ~22.86
        let bmi = calculate_bmi(70.0, 175.0);
        assert!((bmi - 22.86).abs() < 0.01);
    }

    #[test]
    fn test_bmi_result_is_rounded() {
        let bmi = calculate_bmi_result(70.0, 175.0).unwrap();
        assert_eq!(bmi.value, 22.9);
        assert_eq!(bmi.category, BmiCategory::Normal);
        assert_eq!(bmi.to_string(), "22.9 (Normal)");
    }

    #[rstest]
    #[case(18.4, BmiCategory::Underweight)]
    #[case(18.5, BmiCategory::Normal)]
    #[case(24.9, BmiCategory::Normal)]
    #[case(25.0, BmiCategory::Overweight)]
    #[case(29.9, BmiCategory::Overweight)]
    #[case(30.0, BmiCategory::Obese)]
    #[case(45.0, BmiCategory::Obese)]
    fn test_bmi_category_boundaries(#[case] bmi: f64, #[case] expected: BmiCategory) {
        assert_eq!(classify_bmi(bmi), expected);
    }

    #[rstest]
    #[case(0.0, 175.0)]
    #[case(70.0, 0.0)]
    #[case(-5.0, 175.0)]
    #[case(f64::NAN, 175.0)]
    #[case(70.0, f64::INFINITY)]
    fn test_bmi_undefined_for_unusable_input(#[case] weight: f64, #[case] height: f64) {
        assert!(calculate_bmi_result(weight, height).is_none());
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" OTHER ".parse::<Gender>().unwrap(), Gender::Other);
        assert!("unknown".parse::<Gender>().is_err());
        assert_eq!("ATHLETE".parse::<ActivityLevel>().unwrap(), ActivityLevel::Athlete);
        assert!("very_active".parse::<ActivityLevel>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: BMI is always positive
        #[test]
        fn prop_bmi_positive(weight in 20.0f64..500.0, height in 100.0f64..250.0) {
            let bmi = calculate_bmi(weight, height);
            prop_assert!(bmi > 0.0);
        }

        /// Property: Result value is the formula rounded to one decimal
        #[test]
        fn prop_bmi_result_rounds_formula(weight in 2.0f64..300.0, height in 50.0f64..250.0) {
            let result = calculate_bmi_result(weight, height).unwrap();
            let height_m = height / 100.0;
            let expected = (weight / (height_m * height_m) * 10.0).round() / 10.0;
            prop_assert!((result.value - expected).abs() < 1e-9);
            prop_assert_eq!(result.category, classify_bmi(result.value));
        }

        /// Property: Higher weight = higher BMI (same height)
        #[test]
        fn prop_bmi_increases_with_weight(
            weight1 in 50.0f64..80.0,
            weight2 in 81.0f64..120.0,
            height in 150.0f64..200.0
        ) {
            prop_assert!(calculate_bmi(weight1, height) < calculate_bmi(weight2, height));
        }

        /// Property: Classification never decreases as BMI grows
        #[test]
        fn prop_category_is_monotonic(a in 5.0f64..80.0, b in 5.0f64..80.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify_bmi(low) as u8 <= classify_bmi(high) as u8);
        }
    }
}
