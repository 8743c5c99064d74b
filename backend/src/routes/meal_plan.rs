//! Stateless meal plan route
//!
//! One request in, one plan out: the form is normalized and sent for
//! recommendations without touching any session.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use healer_shared::{normalize, MealPlanResponse, RawProfileForm};
use tracing::info;

/// Create meal plan routes
pub fn meal_plan_routes() -> Router<AppState> {
    Router::new().route("/", post(create_meal_plan))
}

/// POST /api/v1/meal-plans - Normalize a profile and recommend meals
async fn create_meal_plan(
    State(state): State<AppState>,
    payload: Result<Json<RawProfileForm>, JsonRejection>,
) -> Result<Json<MealPlanResponse>, ApiError> {
    let Json(form) = payload?;
    let profile = normalize(&form).map_err(|err| {
        metrics::counter!("healer_validation_failures_total").increment(1);
        ApiError::from(err)
    })?;

    info!(bmi = %profile.bmi, "Meal plan requested");
    let result = state.recommendations.request_recommendations(&profile).await;

    Ok(Json(MealPlanResponse { profile, result }))
}
