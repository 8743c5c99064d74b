//! Built-in fallback meal catalog
//!
//! Five complete recipes returned whenever generation is unavailable or its
//! reply is unusable. The catalog depends on the profile only through the
//! sodium figures, which drop for high blood pressure.

use healer_shared::{
    CookingTimeBucket, DietaryPreference, HealthProfile, MealRecommendation, Nutrients,
};
use std::collections::BTreeMap;

struct FallbackRecipe {
    name: &'static str,
    dietary_preference: DietaryPreference,
    cooking_time: CookingTimeBucket,
    cooking_time_label: &'static str,
    total_calories: u32,
    ingredients: &'static [&'static str],
    ingredient_calories: &'static [(&'static str, f64)],
    /// protein, carbs, fats, fiber, sugar in grams
    macros: [f64; 5],
    /// Sodium in mg as (high blood pressure, otherwise)
    sodium: (f64, f64),
    steps: &'static [&'static str],
    key_benefits: &'static str,
    why_this_helps: &'static str,
    match_score: u8,
}

impl FallbackRecipe {
    fn to_meal(&self, high_blood_pressure: bool) -> MealRecommendation {
        let [protein, carbs, fats, fiber, sugar] = self.macros;
        let sodium = if high_blood_pressure {
            self.sodium.0
        } else {
            self.sodium.1
        };

        MealRecommendation {
            name: self.name.to_string(),
            dietary_preference: self.dietary_preference,
            cooking_time: self.cooking_time,
            cooking_time_label: Some(self.cooking_time_label.to_string()),
            total_calories: self.total_calories,
            ingredients: self.ingredients.iter().map(|s| s.to_string()).collect(),
            ingredient_calories: self
                .ingredient_calories
                .iter()
                .map(|(name, kcal)| (name.to_string(), *kcal))
                .collect::<BTreeMap<_, _>>(),
            nutrients: Nutrients {
                protein,
                carbs,
                fats,
                fiber,
                sugar,
                sodium: Some(sodium),
            },
            steps: self.steps.iter().map(|s| s.to_string()).collect(),
            key_benefits: Some(self.key_benefits.to_string()),
            why_this_helps: Some(self.why_this_helps.to_string()),
            match_score: self.match_score,
        }
    }
}

/// The fallback meals for a profile, always exactly five
pub fn fallback_meals(profile: &HealthProfile) -> Vec<MealRecommendation> {
    let high_blood_pressure = profile.has_high_blood_pressure();
    CATALOG
        .iter()
        .map(|recipe| recipe.to_meal(high_blood_pressure))
        .collect()
}

const CATALOG: [FallbackRecipe; 5] = [
    FallbackRecipe {
        name: "Heart-Healthy Mediterranean Quinoa Bowl with Avocado & Salmon",
        dietary_preference: DietaryPreference::NonVegetarian,
        cooking_time: CookingTimeBucket::From15To30,
        cooking_time_label: "25-30min",
        total_calories: 480,
        ingredients: &[
            "1 cup organic quinoa, rinsed thoroughly",
            "2 cups low-sodium vegetable broth",
            "4 oz wild-caught salmon fillet",
            "1/2 large ripe avocado, sliced",
            "1 cup fresh baby spinach leaves",
            "1/4 cup cherry tomatoes, halved",
            "2 tablespoons extra virgin olive oil",
            "1 tablespoon fresh lemon juice",
            "1 teaspoon dried oregano",
            "1/2 teaspoon garlic powder",
            "1/4 cup red onion, finely diced",
            "Black pepper to taste",
        ],
        ingredient_calories: &[
            ("quinoa", 220.0),
            ("salmon", 180.0),
            ("avocado", 120.0),
            ("olive oil", 240.0),
            ("vegetables", 60.0),
            ("seasonings", 10.0),
        ],
        macros: [28.0, 42.0, 22.0, 9.0, 4.0],
        sodium: (380.0, 450.0),
        steps: &[
            "Rinse the quinoa in a fine mesh strainer under cold water for 2 minutes until the water runs clear",
            "Bring the low-sodium broth to a rolling boil in a medium saucepan over high heat",
            "Add the quinoa, reduce the heat to low, cover and simmer for 15 minutes until the liquid is absorbed",
            "Meanwhile preheat the oven to 200°C (400°F) and line a baking sheet with parchment paper",
            "Place the salmon on the sheet, drizzle with 1 tablespoon olive oil and season with oregano, garlic powder and pepper",
            "Bake for 12-15 minutes until the salmon flakes easily and reaches 63°C (145°F) inside",
            "Take the quinoa off the heat, rest it covered for 5 minutes, then fluff with a fork",
            "Whisk the remaining olive oil with the lemon juice and seasonings for the dressing",
            "Build the bowls on a bed of spinach with quinoa, flaked salmon, avocado, tomatoes and red onion",
            "Drizzle with the dressing and serve immediately",
        ],
        key_benefits: "Low sodium, high omega-3, rich in fiber and antioxidants",
        why_this_helps: "Salmon supplies anti-inflammatory omega-3 fatty acids that support cardiovascular health and help lower cholesterol. Quinoa adds complete protein and fiber that steady blood sugar. Avocado brings monounsaturated fats and potassium for blood pressure control, and leafy greens add nitrates that relax blood vessels.",
        match_score: 92,
    },
    FallbackRecipe {
        name: "Blood Sugar Friendly Chickpea & Vegetable Curry with Brown Rice",
        dietary_preference: DietaryPreference::Vegan,
        cooking_time: CookingTimeBucket::From30To60,
        cooking_time_label: "30-40min",
        total_calories: 420,
        ingredients: &[
            "1 cup brown rice, uncooked",
            "1 can (15 oz) low-sodium chickpeas, drained and rinsed",
            "1 cup cauliflower florets",
            "1/2 cup green beans, trimmed and cut",
            "1/2 onion, finely chopped",
            "2 cloves garlic, minced",
            "1 tablespoon fresh ginger, grated",
            "1 can (14 oz) diced tomatoes, no salt added",
            "1 cup light coconut milk",
            "2 teaspoons curry powder",
            "1 teaspoon turmeric",
            "1/2 teaspoon cumin",
            "1 tablespoon coconut oil",
            "Fresh cilantro for garnish",
        ],
        ingredient_calories: &[
            ("brown rice", 220.0),
            ("chickpeas", 270.0),
            ("vegetables", 80.0),
            ("coconut milk", 120.0),
            ("coconut oil", 120.0),
            ("spices", 10.0),
        ],
        macros: [18.0, 65.0, 12.0, 15.0, 8.0],
        sodium: (320.0, 400.0),
        steps: &[
            "Rinse the brown rice and cook it as the package directs, using water or low-sodium broth",
            "Heat the coconut oil in a large skillet over medium heat until shimmering",
            "Sauté the onion for 5 minutes until translucent",
            "Add the garlic and ginger and cook for 1 minute without browning",
            "Stir in the curry powder, turmeric and cumin and toast for 30 seconds",
            "Add the tomatoes with their juices and simmer gently for 5 minutes",
            "Add the chickpeas, cauliflower and green beans and stir to coat with the sauce",
            "Pour in the coconut milk, bring back to a simmer, then lower the heat and cover",
            "Cook for 15-20 minutes until the vegetables are tender but keep some bite",
            "Adjust the spices to taste without adding salt",
            "Serve over the brown rice, garnished with cilantro",
        ],
        key_benefits: "High fiber, low glycemic index, plant-based protein",
        why_this_helps: "Chickpeas release their carbohydrates slowly and add plant protein, keeping blood sugar stable. Brown rice has a lower glycemic index than white rice. Turmeric contributes anti-inflammatory curcumin, and 15g of fiber per serving helps lower cholesterol and supports digestion.",
        match_score: 88,
    },
    FallbackRecipe {
        name: "Immune-Boosting Ginger Turmeric Chicken Soup with Vegetables",
        dietary_preference: DietaryPreference::NonVegetarian,
        cooking_time: CookingTimeBucket::From30To60,
        cooking_time_label: "40-50min",
        total_calories: 380,
        ingredients: &[
            "6 cups low-sodium chicken broth",
            "2 chicken breasts, boneless and skinless",
            "1 tablespoon fresh ginger, grated",
            "2 teaspoons fresh turmeric, grated",
            "3 cloves garlic, minced",
            "1 onion, diced",
            "2 carrots, sliced",
            "2 celery stalks, chopped",
            "1 cup kale, stems removed and chopped",
            "1 zucchini, diced",
            "2 tablespoons olive oil",
            "1 bay leaf",
            "1 teaspoon thyme",
            "Black pepper to taste",
            "Fresh parsley for garnish",
        ],
        ingredient_calories: &[
            ("chicken", 230.0),
            ("broth", 40.0),
            ("vegetables", 80.0),
            ("olive oil", 240.0),
            ("herbs and spices", 10.0),
        ],
        macros: [35.0, 22.0, 18.0, 6.0, 8.0],
        sodium: (350.0, 420.0),
        steps: &[
            "Heat the olive oil in a large stockpot over medium heat",
            "Sauté the onion for 5 minutes until soft",
            "Add the garlic, ginger and turmeric and cook for 1 minute until fragrant",
            "Pour in the broth and bring it to a gentle boil",
            "Add the chicken breasts with the bay leaf and thyme",
            "Cover and simmer on low for 20 minutes until the chicken is cooked through",
            "Lift out the chicken, let it cool slightly and shred it with two forks",
            "Simmer the carrots and celery in the broth for 10 minutes",
            "Add the zucchini and cook for another 5 minutes",
            "Return the chicken, add the kale and cook for 2-3 minutes until it wilts",
            "Season with pepper and remove the bay leaf",
            "Serve hot, garnished with parsley",
        ],
        key_benefits: "Anti-inflammatory, hydrating, rich in vitamins and minerals",
        why_this_helps: "Ginger and turmeric are anti-inflammatory and support the immune system. Chicken gives lean protein for tissue repair, while the broth keeps you hydrated at few calories. Low-sodium broth keeps the soup heart-friendly and easy to digest during recovery.",
        match_score: 95,
    },
    FallbackRecipe {
        name: "Low-Sodium Asian Stir-Fry with Tofu and Vegetables",
        dietary_preference: DietaryPreference::Vegetarian,
        cooking_time: CookingTimeBucket::From15To30,
        cooking_time_label: "20-25min",
        total_calories: 350,
        ingredients: &[
            "8 oz firm tofu, pressed and cubed",
            "2 cups mixed vegetables (broccoli, bell peppers, carrots, snap peas)",
            "2 cloves garlic, minced",
            "1 tablespoon fresh ginger, grated",
            "2 tablespoons low-sodium soy sauce",
            "1 tablespoon rice vinegar",
            "1 teaspoon sesame oil",
            "1 tablespoon olive oil",
            "1 teaspoon cornstarch",
            "2 tablespoons water",
            "1/4 cup green onions, chopped",
            "1 tablespoon sesame seeds",
            "1 cup brown rice, cooked",
        ],
        ingredient_calories: &[
            ("tofu", 180.0),
            ("vegetables", 100.0),
            ("rice", 220.0),
            ("oils", 120.0),
            ("sauces", 30.0),
            ("seasonings", 10.0),
        ],
        macros: [22.0, 45.0, 12.0, 8.0, 6.0],
        sodium: (320.0, 380.0),
        steps: &[
            "Press the tofu for 15 minutes, then cut it into 2 cm cubes",
            "Heat the olive oil in a wok over medium-high heat",
            "Brown the tofu on all sides for 5-7 minutes, then set it aside",
            "Fry the garlic and ginger in the same pan for 30 seconds",
            "Stir-fry the vegetables for 4-5 minutes until crisp-tender",
            "Whisk the soy sauce, rice vinegar, cornstarch and water together",
            "Return the tofu and pour the sauce over everything",
            "Stir for 2-3 minutes until the sauce thickens and coats the pan",
            "Drizzle with sesame oil and toss",
            "Serve over brown rice with green onions and sesame seeds",
        ],
        key_benefits: "Low sodium, plant-based protein, rich in antioxidants",
        why_this_helps: "Tofu is a complete plant protein that is low in saturated fat. The mix of vegetables supplies antioxidants, and low-sodium soy sauce keeps the dish heart-friendly. Its fiber slows digestion and keeps blood sugar steady, which also helps with weight management.",
        match_score: 90,
    },
    FallbackRecipe {
        name: "Omega-3 Rich Baked Mackerel with Roasted Sweet Potatoes and Greens",
        dietary_preference: DietaryPreference::NonVegetarian,
        cooking_time: CookingTimeBucket::From30To60,
        cooking_time_label: "30-35min",
        total_calories: 420,
        ingredients: &[
            "2 mackerel fillets (6 oz each)",
            "2 medium sweet potatoes, peeled and cubed",
            "4 cups mixed greens (spinach, arugula, kale)",
            "2 tablespoons olive oil",
            "1 lemon, sliced",
            "2 cloves garlic, minced",
            "1 teaspoon paprika",
            "1/2 teaspoon dried thyme",
            "1/4 teaspoon black pepper",
            "1 tablespoon balsamic vinegar",
            "1/4 cup red onion, thinly sliced",
        ],
        ingredient_calories: &[
            ("mackerel", 280.0),
            ("sweet potatoes", 180.0),
            ("greens", 40.0),
            ("olive oil", 240.0),
            ("seasonings", 10.0),
        ],
        macros: [30.0, 35.0, 18.0, 7.0, 12.0],
        sodium: (280.0, 350.0),
        steps: &[
            "Preheat the oven to 200°C (400°F) and line two baking sheets with parchment",
            "Toss the sweet potatoes with 1 tablespoon olive oil, paprika and pepper",
            "Roast them in a single layer for 25-30 minutes until tender",
            "Lay the mackerel skin side down on the second sheet",
            "Rub with garlic, thyme and the remaining oil and top with lemon slices",
            "Bake for 12-15 minutes until the fish flakes easily",
            "Meanwhile toss the greens with the red onion",
            "Dress the salad with balsamic vinegar and a pinch of pepper",
            "Plate the mackerel with the sweet potatoes and salad",
            "Finish with a squeeze of lemon",
        ],
        key_benefits: "High omega-3, anti-inflammatory, blood sugar stabilizing",
        why_this_helps: "Mackerel is one of the richest sources of omega-3 fatty acids, which calm inflammation and support heart and brain health. Sweet potatoes have a lower glycemic index than white potatoes, and together with the fiber from the greens they keep blood sugar levels stable.",
        match_score: 93,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use healer_shared::{normalize, MEALS_PER_PLAN};
    use healer_shared::RawProfileForm;
    use rstest::rstest;

    fn profile(bp_level: &str) -> HealthProfile {
        normalize(&RawProfileForm {
            name: Some("Ravi".to_string()),
            age: Some(52.0.into()),
            gender: Some("Male".to_string()),
            height: Some(172.0.into()),
            weight: Some(81.0.into()),
            bp_level: Some(bp_level.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_catalog_is_complete() {
        let meals = fallback_meals(&profile("Normal"));
        assert_eq!(meals.len(), MEALS_PER_PLAN);
        for meal in &meals {
            assert!(meal.check().is_ok(), "{} is incomplete", meal.name);
            assert!(meal.why_this_helps.is_some());
            assert_eq!(
                CookingTimeBucket::from_label(meal.cooking_time_display()),
                Some(meal.cooking_time)
            );
        }
    }

    #[rstest]
    #[case("High", [380.0, 320.0, 350.0, 320.0, 280.0])]
    #[case("Normal", [450.0, 400.0, 420.0, 380.0, 350.0])]
    #[case("Low", [450.0, 400.0, 420.0, 380.0, 350.0])]
    fn test_sodium_follows_blood_pressure(#[case] level: &str, #[case] expected: [f64; 5]) {
        let sodium: Vec<f64> = fallback_meals(&profile(level))
            .iter()
            .map(|m| m.nutrients.sodium.unwrap())
            .collect();
        assert_eq!(sodium, expected);
    }

    fn reading_profile(systolic: f64) -> HealthProfile {
        normalize(&RawProfileForm {
            name: Some("Ravi".to_string()),
            age: Some(52.0.into()),
            gender: Some("Male".to_string()),
            height: Some(172.0.into()),
            weight: Some(81.0.into()),
            bp_level: Some("Normal".to_string()),
            bp_advanced_mode: true,
            systolic: Some(systolic.into()),
            diastolic: Some(85.0.into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case(135.0, [380.0, 320.0, 350.0, 320.0, 280.0])]
    #[case(131.0, [380.0, 320.0, 350.0, 320.0, 280.0])]
    #[case(130.0, [450.0, 400.0, 420.0, 380.0, 350.0])]
    #[case(118.0, [450.0, 400.0, 420.0, 380.0, 350.0])]
    fn test_sodium_follows_systolic_reading(#[case] systolic: f64, #[case] expected: [f64; 5]) {
        let sodium: Vec<f64> = fallback_meals(&reading_profile(systolic))
            .iter()
            .map(|m| m.nutrients.sodium.unwrap())
            .collect();
        assert_eq!(sodium, expected);
    }

    #[test]
    fn test_only_sodium_depends_on_profile() {
        let high = fallback_meals(&profile("High"));
        let normal = fallback_meals(&profile("Normal"));
        for (mut a, b) in high.into_iter().zip(normal) {
            a.nutrients.sodium = b.nutrients.sodium;
            assert_eq!(a, b);
        }
    }
}
