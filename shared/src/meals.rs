//! Meal recommendation types
//!
//! A recommendation result always holds between one and five fully specified
//! recipes, or an explicit failure message. Cooking times are stored as one
//! of four canonical buckets so filtering never depends on how the text was
//! phrased.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of recipes requested per plan
pub const MEALS_PER_PLAN: usize = 5;

/// Message shown when a plan ends up without any meal
pub const EMPTY_RESULT_MESSAGE: &str =
    "No meals were generated. Please try again with different inputs.";

// ============================================================================
// Dietary Preference
// ============================================================================

/// Dietary category of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietaryPreference {
    Vegetarian,
    Eggetarian,
    #[serde(rename = "Non-vegetarian")]
    NonVegetarian,
    Vegan,
}

impl DietaryPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryPreference::Vegetarian => "Vegetarian",
            DietaryPreference::Eggetarian => "Eggetarian",
            DietaryPreference::NonVegetarian => "Non-vegetarian",
            DietaryPreference::Vegan => "Vegan",
        }
    }
}

impl FromStr for DietaryPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match compact.as_str() {
            "vegetarian" => Ok(DietaryPreference::Vegetarian),
            "eggetarian" => Ok(DietaryPreference::Eggetarian),
            "nonvegetarian" => Ok(DietaryPreference::NonVegetarian),
            "vegan" => Ok(DietaryPreference::Vegan),
            _ => Err(format!("unknown dietary category {:?}", s)),
        }
    }
}

impl fmt::Display for DietaryPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Cooking Time
// ============================================================================

/// Cooking-time bucket of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CookingTimeBucket {
    #[serde(rename = "<15min")]
    Under15,
    #[serde(rename = "15-30min")]
    From15To30,
    #[serde(rename = "30-60min")]
    From30To60,
    #[serde(rename = ">60min")]
    Over60,
}

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(under|less than|below|<)\s*)?(\d+(?:\.\d+)?)\s*(hours?|hrs?|h|minutes?|mins?|m)?\b",
    )
    .expect("duration pattern is valid")
});
static JOINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:and|,)?\s*$").expect("joiner pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Hours,
    Minutes,
}

/// A number found in a cooking-time label
#[derive(Debug, Clone, Copy)]
struct Quantity {
    value: f64,
    unit: Option<TimeUnit>,
    /// Preceded by "under", "less than", "below" or "<"
    below: bool,
    start: usize,
    end: usize,
}

impl Quantity {
    fn minutes(&self) -> f64 {
        match self.unit {
            Some(TimeUnit::Hours) => self.value * 60.0,
            _ => self.value,
        }
    }
}

fn quantities(text: &str) -> Vec<Quantity> {
    let mut found: Vec<Quantity> = DURATION
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = caps.get(2)?.as_str().parse::<f64>().ok()?;
            let unit = caps.get(3).map(|u| {
                if u.as_str().starts_with('h') {
                    TimeUnit::Hours
                } else {
                    TimeUnit::Minutes
                }
            });
            Some(Quantity {
                value,
                unit,
                below: caps.get(1).is_some(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect();

    // A bare number takes the unit of the next one that has a unit ("1-2 hours")
    let mut next_unit = TimeUnit::Minutes;
    for quantity in found.iter_mut().rev() {
        match quantity.unit {
            Some(unit) => next_unit = unit,
            None => quantity.unit = Some(next_unit),
        }
    }
    found
}

impl CookingTimeBucket {
    pub const ALL: [CookingTimeBucket; 4] = [
        CookingTimeBucket::Under15,
        CookingTimeBucket::From15To30,
        CookingTimeBucket::From30To60,
        CookingTimeBucket::Over60,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CookingTimeBucket::Under15 => "<15min",
            CookingTimeBucket::From15To30 => "15-30min",
            CookingTimeBucket::From30To60 => "30-60min",
            CookingTimeBucket::Over60 => ">60min",
        }
    }

    /// Substring that identifies the bucket inside free text
    pub fn marker(&self) -> &'static str {
        match self {
            CookingTimeBucket::Under15 => "<15",
            CookingTimeBucket::From15To30 => "15-30",
            CookingTimeBucket::From30To60 => "30-60",
            CookingTimeBucket::Over60 => ">60",
        }
    }

    /// Bucket for a duration in minutes (upper bounds inclusive)
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes < 15.0 {
            CookingTimeBucket::Under15
        } else if minutes <= 30.0 {
            CookingTimeBucket::From15To30
        } else if minutes <= 60.0 {
            CookingTimeBucket::From30To60
        } else {
            CookingTimeBucket::Over60
        }
    }

    /// Bucket for a strict upper bound ("under 15 minutes")
    fn below(bound: f64) -> Self {
        if bound <= 15.0 {
            CookingTimeBucket::Under15
        } else if bound <= 30.0 {
            CookingTimeBucket::From15To30
        } else if bound <= 60.0 {
            CookingTimeBucket::From30To60
        } else {
            CookingTimeBucket::Over60
        }
    }

    /// Normalize a free-text cooking time
    ///
    /// A canonical marker wins. Otherwise every duration mentioned is read
    /// with its own unit; an hour count directly followed by minutes adds up
    /// ("1 hour 15 min"), and the longest duration picks the bucket. A
    /// duration introduced by "under" or "less than" is an exclusive bound.
    /// Returns `None` when the text holds no duration at all.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_lowercase().replace(['\u{2013}', '\u{2014}'], "-");
        let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();

        if let Some(bucket) = Self::ALL.iter().find(|b| compact.contains(b.marker())) {
            return Some(*bucket);
        }

        let found = quantities(&lower);
        let mut durations: Vec<(f64, bool)> = Vec::with_capacity(found.len());
        let mut i = 0;
        while i < found.len() {
            let current = found[i];
            match found.get(i + 1) {
                Some(next)
                    if current.unit == Some(TimeUnit::Hours)
                        && next.unit == Some(TimeUnit::Minutes)
                        && JOINER.is_match(&lower[current.end..next.start]) =>
                {
                    durations.push((current.minutes() + next.minutes(), current.below));
                    i += 2;
                }
                _ => {
                    durations.push((current.minutes(), current.below));
                    i += 1;
                }
            }
        }

        let (minutes, below) = durations
            .into_iter()
            .max_by(|a, b| a.0.total_cmp(&b.0))?;

        Some(if below {
            Self::below(minutes)
        } else {
            Self::from_minutes(minutes)
        })
    }
}

impl FromStr for CookingTimeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown cooking time {:?}", s))
    }
}

impl fmt::Display for CookingTimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Meal Recommendation
// ============================================================================

/// Nutrient breakdown of one serving (grams, sodium in mg)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub sugar: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl Nutrients {
    fn values(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("protein", Some(self.protein)),
            ("carbs", Some(self.carbs)),
            ("fats", Some(self.fats)),
            ("fiber", Some(self.fiber)),
            ("sugar", Some(self.sugar)),
            ("sodium", self.sodium),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

/// One recipe of a meal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecommendation {
    pub name: String,
    pub dietary_preference: DietaryPreference,
    pub cooking_time: CookingTimeBucket,
    /// Cooking time as originally phrased, when it differs from the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time_label: Option<String>,
    pub total_calories: u32,
    pub ingredients: Vec<String>,
    pub ingredient_calories: BTreeMap<String, f64>,
    pub nutrients: Nutrients,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_benefits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_this_helps: Option<String>,
    pub match_score: u8,
}

impl MealRecommendation {
    /// Check the recipe invariants
    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("meal name is empty".to_string());
        }
        if self.ingredients.iter().all(|i| i.trim().is_empty()) {
            return Err(format!("{}: ingredient list is empty", self.name));
        }
        if self.steps.iter().all(|s| s.trim().is_empty()) {
            return Err(format!("{}: preparation steps are empty", self.name));
        }
        for (nutrient, value) in self.nutrients.values() {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{}: {} must be a non-negative number", self.name, nutrient));
            }
        }
        for (ingredient, calories) in &self.ingredient_calories {
            if !calories.is_finite() || *calories < 0.0 {
                return Err(format!(
                    "{}: calories for {} must be a non-negative number",
                    self.name, ingredient
                ));
            }
        }
        if self.match_score > 100 {
            return Err(format!("{}: match score must be between 0 and 100", self.name));
        }
        Ok(())
    }

    /// Cooking time for display: the original phrasing when there was one
    pub fn cooking_time_display(&self) -> &str {
        self.cooking_time_label
            .as_deref()
            .unwrap_or(self.cooking_time.as_str())
    }
}

// ============================================================================
// Recommendation Result
// ============================================================================

/// Where the meals of a successful result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSource {
    Generated,
    Fallback,
}

impl MealSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSource::Generated => "generated",
            MealSource::Fallback => "fallback",
        }
    }
}

/// Outcome of one recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationResult {
    Success {
        meals: Vec<MealRecommendation>,
        source: MealSource,
    },
    Failure {
        message: String,
    },
}

impl RecommendationResult {
    /// Build a result, failing when there is nothing to show
    pub fn from_meals(mut meals: Vec<MealRecommendation>, source: MealSource) -> Self {
        if meals.is_empty() {
            return Self::failure(EMPTY_RESULT_MESSAGE);
        }
        meals.truncate(MEALS_PER_PLAN);
        RecommendationResult::Success { meals, source }
    }

    pub fn failure(message: &str) -> Self {
        RecommendationResult::Failure {
            message: message.to_string(),
        }
    }

    /// Meals of a successful result; empty for a failure
    pub fn meals(&self) -> &[MealRecommendation] {
        match self {
            RecommendationResult::Success { meals, .. } => meals,
            RecommendationResult::Failure { .. } => &[],
        }
    }

    pub fn source(&self) -> Option<MealSource> {
        match self {
            RecommendationResult::Success { source, .. } => Some(*source),
            RecommendationResult::Failure { .. } => None,
        }
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Dietary filter: everything, or one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietaryFilter {
    #[default]
    All,
    Only(DietaryPreference),
}

impl FromStr for DietaryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(DietaryFilter::All);
        }
        trimmed.parse().map(DietaryFilter::Only)
    }
}

/// Cooking-time filter: everything, or one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CookingTimeFilter {
    #[default]
    All,
    Only(CookingTimeBucket),
}

impl FromStr for CookingTimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(CookingTimeFilter::All);
        }
        trimmed.parse().map(CookingTimeFilter::Only)
    }
}

/// Client-side meal filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MealFilter {
    pub dietary: DietaryFilter,
    pub cooking_time: CookingTimeFilter,
}

impl MealFilter {
    /// Build a filter from optional query values ("All" when absent)
    pub fn parse(dietary: Option<&str>, cooking_time: Option<&str>) -> Result<Self, String> {
        Ok(Self {
            dietary: dietary.map(str::parse).transpose()?.unwrap_or_default(),
            cooking_time: cooking_time.map(str::parse).transpose()?.unwrap_or_default(),
        })
    }

    pub fn matches(&self, meal: &MealRecommendation) -> bool {
        let dietary_ok = match self.dietary {
            DietaryFilter::All => true,
            DietaryFilter::Only(pref) => meal.dietary_preference == pref,
        };
        let time_ok = match self.cooking_time {
            CookingTimeFilter::All => true,
            CookingTimeFilter::Only(bucket) => meal.cooking_time.as_str().contains(bucket.marker()),
        };
        dietary_ok && time_ok
    }

    /// Matching meals with their position in the full list
    pub fn apply<'a>(
        &'a self,
        meals: &'a [MealRecommendation],
    ) -> impl Iterator<Item = (usize, &'a MealRecommendation)> + 'a {
        meals
            .iter()
            .enumerate()
            .filter(move |(_, meal)| self.matches(meal))
    }
}
