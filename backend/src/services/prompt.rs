//! Recommendation prompt construction

use healer_shared::{format_measure, HealthPriorities, HealthProfile, MEALS_PER_PLAN};
use std::fmt::Write;

/// Reply shape the model is asked to follow
const RESPONSE_FORMAT: &str = r#"{
  "meals": [
    {
      "name": "Descriptive recipe name",
      "dietaryPreference": "Vegetarian | Eggetarian | Non-vegetarian | Vegan",
      "cookingTime": "<15min | 15-30min | 30-60min | >60min",
      "totalCalories": 450,
      "ingredients": ["1 cup ingredient with quantity", "2 tablespoons another ingredient"],
      "ingredientCalories": { "ingredient": 150, "another ingredient": 80 },
      "nutrients": { "protein": 25, "carbs": 45, "fats": 15, "fiber": 8, "sugar": 12, "sodium": 380 },
      "steps": ["Step with time and temperature", "Next step"],
      "keyBenefits": "Short summary of the benefits for this person",
      "whyThisHelps": "How the meal addresses their conditions",
      "matchScore": 92
    }
  ]
}"#;

fn list_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn reading_or(value: Option<f64>) -> String {
    value
        .map(|v| format!("{} mg/dL", format_measure(v)))
        .unwrap_or_else(|| "Not specified".to_string())
}

/// Build the generation prompt for a profile
///
/// Carries every profile field, the medical priorities that apply, and the
/// exact JSON shape expected back.
pub fn build_prompt(profile: &HealthProfile) -> String {
    let priorities = HealthPriorities::from_profile(profile);
    let ingredients = profile
        .available_ingredients
        .as_deref()
        .unwrap_or("Not specified");

    let mut prompt = String::with_capacity(4096);
    let _ = writeln!(
        prompt,
        "You are an expert nutritionist, chef and medical assistant. Based on the health \
         profile below, create exactly {} detailed, healthy meal recipes that address this \
         person's conditions and preferences.",
        MEALS_PER_PLAN
    );

    prompt.push_str("\nHEALTH PROFILE:\n");
    let _ = writeln!(prompt, "- Name: {}", profile.name);
    let _ = writeln!(prompt, "- Age: {}", profile.age);
    let _ = writeln!(prompt, "- Gender: {}", profile.gender);
    let _ = writeln!(prompt, "- Height: {} cm", format_measure(profile.height_cm));
    let _ = writeln!(prompt, "- Weight: {} kg", format_measure(profile.weight_kg));
    let _ = writeln!(prompt, "- BMI: {}", profile.bmi);
    let _ = writeln!(prompt, "- Blood Pressure: {}", profile.blood_pressure);
    let _ = writeln!(prompt, "- Cholesterol: {}", profile.cholesterol);
    let _ = writeln!(prompt, "- Fasting Glucose: {}", reading_or(profile.glucose.fasting));
    let _ = writeln!(prompt, "- Post-Meal Glucose: {}", reading_or(profile.glucose.post_meal));
    let _ = writeln!(prompt, "- Allergies: {}", list_or(&profile.allergies, "None"));
    let _ = writeln!(
        prompt,
        "- Activity Level: {} ({})",
        profile.activity_level,
        profile.activity_level.description()
    );
    let _ = writeln!(prompt, "- Available Ingredients: {}", ingredients);
    let _ = writeln!(
        prompt,
        "- Health Issues: {}",
        list_or(&profile.health_issues, "None specified")
    );

    prompt.push_str("\nCRITICAL REQUIREMENTS:\n");
    let _ = writeln!(
        prompt,
        "1. Prioritize medical conditions: high blood pressure calls for low sodium \
         (<500mg per serving), high cholesterol for high fiber and low saturated fat."
    );
    let _ = writeln!(
        prompt,
        "2. Strictly exclude any ingredient related to these allergies: {}",
        list_or(&profile.allergies, "none")
    );
    let _ = writeln!(
        prompt,
        "3. Prefer the available ingredients: {}",
        profile
            .available_ingredients
            .as_deref()
            .unwrap_or("use common healthy ingredients")
    );
    let _ = writeln!(
        prompt,
        "4. Target these health issues with nutrition: {}",
        list_or(&profile.health_issues, "general health maintenance")
    );

    let applied = priorities.lines();
    if !applied.is_empty() {
        prompt.push_str("\nPRIORITIES FOR THIS PERSON:\n");
        for line in applied {
            let _ = writeln!(prompt, "- {}", line);
        }
    }

    prompt.push_str(
        "\nRECIPE REQUIREMENTS:\n\
         1. Practical, detailed recipes for home cooking\n\
         2. Exact quantities for every ingredient\n\
         3. Numbered step-by-step instructions with times, temperatures and techniques\n\
         4. Total calories and a macronutrient breakdown in grams, sodium in mg\n\
         5. Calories per ingredient\n\
         6. An explanation of why the meal helps this person's conditions\n\
         7. A dietary category: Vegetarian, Eggetarian, Non-vegetarian or Vegan\n\
         8. A cooking time category: <15min, 15-30min, 30-60min or >60min\n\
         9. A match score from 0 to 100\n",
    );

    prompt.push_str("\nRespond with ONLY valid JSON in exactly this format, with no other text:\n");
    prompt.push_str(RESPONSE_FORMAT);
    let _ = write!(
        prompt,
        "\n\nGenerate exactly {} different recipes that are medically appropriate, \
         nutritionally balanced and practical.\n",
        MEALS_PER_PLAN
    );

    prompt
}
