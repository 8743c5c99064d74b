//! Chart series for a single meal
//!
//! Plain label/value pairs; rendering is left to the client.

use crate::meals::MealRecommendation;
use serde::{Deserialize, Serialize};

/// Labels of the nutrient chart, in display order
pub const NUTRIENT_LABELS: [&str; 5] = ["Protein", "Carbohydrates", "Fats", "Fiber", "Sugar"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Both charts shown for a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealCharts {
    pub meal_name: String,
    /// Calories per ingredient; absent when the meal has no breakdown
    pub ingredient_calories: Option<ChartSeries>,
    /// Grams per macronutrient
    pub nutrients: ChartSeries,
}

impl MealCharts {
    pub fn for_meal(meal: &MealRecommendation) -> Self {
        let ingredient_calories = if meal.ingredient_calories.is_empty() {
            None
        } else {
            Some(ChartSeries {
                labels: meal.ingredient_calories.keys().cloned().collect(),
                values: meal.ingredient_calories.values().copied().collect(),
            })
        };

        let n = &meal.nutrients;
        Self {
            meal_name: meal.name.clone(),
            ingredient_calories,
            nutrients: ChartSeries {
                labels: NUTRIENT_LABELS.iter().map(|l| l.to_string()).collect(),
                values: vec![n.protein, n.carbs, n.fats, n.fiber, n.sugar],
            },
        }
    }
}
