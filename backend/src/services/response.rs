//! Parsing of generation replies
//!
//! Replies are cleaned (code fences stripped, outermost JSON object
//! extracted), decoded into a loose wire schema, then converted into
//! [`MealRecommendation`]s. Any malformed meal rejects the whole reply.

use healer_shared::{
    CookingTimeBucket, DietaryPreference, MealRecommendation, Nutrients, RecommendationError,
    MEALS_PER_PLAN,
};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("object pattern is valid"));

#[derive(Debug, Deserialize)]
struct WireReply {
    meals: Option<Vec<WireMeal>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMeal {
    name: String,
    dietary_preference: String,
    cooking_time: Value,
    total_calories: f64,
    ingredients: Vec<String>,
    #[serde(default)]
    ingredient_calories: BTreeMap<String, f64>,
    nutrients: WireNutrients,
    steps: Vec<String>,
    key_benefits: Option<String>,
    why_this_helps: Option<String>,
    match_score: f64,
}

#[derive(Debug, Deserialize)]
struct WireNutrients {
    protein: f64,
    carbs: f64,
    fats: f64,
    fiber: f64,
    sugar: f64,
    sodium: Option<f64>,
}

/// Outermost `{...}` span of a reply
pub fn extract_json(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text.trim()).map(|m| m.as_str())
}

/// Parse a reply into at most five meals
pub fn parse_meals(text: &str) -> Result<Vec<MealRecommendation>, RecommendationError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let json = extract_json(&cleaned)
        .ok_or_else(|| RecommendationError::Parse("reply contains no JSON object".to_string()))?;

    let reply: WireReply = serde_json::from_str(json)
        .map_err(|e| RecommendationError::Parse(format!("invalid JSON: {}", e)))?;
    let wire_meals = reply
        .meals
        .ok_or_else(|| RecommendationError::Parse("reply has no meals list".to_string()))?;

    if wire_meals.is_empty() {
        return Err(RecommendationError::EmptyResult);
    }
    if wire_meals.len() > MEALS_PER_PLAN {
        tracing::debug!(
            received = wire_meals.len(),
            "Truncating generated meals to {}",
            MEALS_PER_PLAN
        );
    }

    wire_meals
        .into_iter()
        .take(MEALS_PER_PLAN)
        .enumerate()
        .map(|(i, wire)| {
            into_meal(wire).map_err(|msg| RecommendationError::Parse(format!("meal {}: {}", i + 1, msg)))
        })
        .collect()
}

fn into_meal(wire: WireMeal) -> Result<MealRecommendation, String> {
    let dietary_preference: DietaryPreference = wire.dietary_preference.parse()?;

    let (cooking_time, label) = match &wire.cooking_time {
        Value::String(text) => {
            let bucket = CookingTimeBucket::from_label(text)
                .ok_or_else(|| format!("cooking time {:?} has no duration", text))?;
            let label = text.trim();
            let label = (label != bucket.as_str()).then(|| label.to_string());
            (bucket, label)
        }
        Value::Number(n) => {
            let minutes = n
                .as_f64()
                .filter(|m| m.is_finite() && *m > 0.0)
                .ok_or_else(|| format!("cooking time {} is not a duration", n))?;
            (
                CookingTimeBucket::from_minutes(minutes),
                Some(format!("{} min", minutes)),
            )
        }
        other => return Err(format!("cooking time {} is not a duration", other)),
    };

    if !wire.total_calories.is_finite() || wire.total_calories < 0.0 {
        return Err("total calories must be a non-negative number".to_string());
    }
    if !(0.0..=100.0).contains(&wire.match_score) {
        return Err("match score must be between 0 and 100".to_string());
    }

    let meal = MealRecommendation {
        name: wire.name.trim().to_string(),
        dietary_preference,
        cooking_time,
        cooking_time_label: label,
        total_calories: wire.total_calories.round() as u32,
        ingredients: wire.ingredients,
        ingredient_calories: wire.ingredient_calories,
        nutrients: Nutrients {
            protein: wire.nutrients.protein,
            carbs: wire.nutrients.carbs,
            fats: wire.nutrients.fats,
            fiber: wire.nutrients.fiber,
            sugar: wire.nutrients.sugar,
            sodium: wire.nutrients.sodium,
        },
        steps: wire.steps,
        key_benefits: wire.key_benefits.filter(|s| !s.trim().is_empty()),
        why_this_helps: wire.why_this_helps.filter(|s| !s.trim().is_empty()),
        match_score: wire.match_score.round() as u8,
    };
    meal.check()?;
    Ok(meal)
}
