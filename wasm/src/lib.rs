//! HEALER WASM Module
//!
//! Browser bindings for the parts of the form/results flow that run without
//! a round trip: the BMI preview while typing, cooking-time labels and the
//! meal filter.

use healer_shared::{calculate_bmi_result, CookingTimeBucket, MealFilter, MealRecommendation};
use wasm_bindgen::prelude::*;

/// BMI preview, e.g. `22.9 (Normal)`; empty when it cannot be computed
#[wasm_bindgen]
pub fn bmi_preview(weight_kg: f64, height_cm: f64) -> String {
    calculate_bmi_result(weight_kg, height_cm)
        .map(|bmi| bmi.to_string())
        .unwrap_or_default()
}

/// Canonical bucket for a free-text cooking time, empty if it has no duration
#[wasm_bindgen]
pub fn cooking_time_bucket(label: &str) -> String {
    CookingTimeBucket::from_label(label)
        .map(|bucket| bucket.as_str().to_string())
        .unwrap_or_default()
}

/// Indices of the meals matching the filter
///
/// `meals_json` is the `meals` array of a successful result. Empty or `All`
/// filter values match everything.
#[wasm_bindgen]
pub fn filter_meals(
    meals_json: &str,
    dietary: &str,
    cooking_time: &str,
) -> Result<Vec<u32>, JsValue> {
    matching_indices(meals_json, dietary, cooking_time).map_err(|e| JsValue::from_str(&e))
}

fn matching_indices(meals_json: &str, dietary: &str, cooking_time: &str) -> Result<Vec<u32>, String> {
    let meals: Vec<MealRecommendation> =
        serde_json::from_str(meals_json).map_err(|e| format!("invalid meals: {}", e))?;
    let filter = MealFilter::parse(Some(dietary), Some(cooking_time))?;

    Ok(filter
        .apply(&meals)
        .map(|(index, _)| index as u32)
        .collect())
}
