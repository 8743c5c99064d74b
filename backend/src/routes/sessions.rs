//! Session API routes
//!
//! Drive the form/results flow of one user: submit a profile, browse and
//! filter the meals, chart one, export the plan, retry or start over.

use crate::error::ApiError;
use crate::services::export::{export_file_name, layout_document, render_pdf};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use healer_shared::{
    FilteredMealsResponse, IndexedMeal, MealCharts, MealChartsResponse, MealFilter,
    MealFilterQuery, RawProfileForm, SessionResponse,
};
use tracing::info;
use uuid::Uuid;

/// Create session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session).delete(delete_session))
        .route("/:id/submit", post(submit_profile))
        .route("/:id/retry", post(retry_recommendations))
        .route("/:id/plan", delete(reset_plan))
        .route("/:id/meals", get(list_meals))
        .route("/:id/meals/:index/charts", get(meal_charts))
        .route("/:id/export", get(export_pdf))
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid session id: {}", raw)))
}

/// POST /api/v1/sessions - Start an empty session
async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(state.sessions.create().await)
}

/// GET /api/v1/sessions/:id
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    Ok(Json(state.sessions.get(id).await?.to_response()))
}

/// DELETE /api/v1/sessions/:id - Forget the session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    state.sessions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/submit - Submit the profile form
///
/// Answers once recommendations are in; a form that fails validation
/// gets a 400 naming the offending field.
async fn submit_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RawProfileForm>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let Json(form) = payload?;
    Ok(Json(state.sessions.submit(id, &form).await?))
}

/// POST /api/v1/sessions/:id/retry - Regenerate for the stored profile
async fn retry_recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    Ok(Json(state.sessions.retry(id).await?))
}

/// DELETE /api/v1/sessions/:id/plan - Back to an empty form
async fn reset_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    Ok(Json(state.sessions.reset(id).await?))
}

/// GET /api/v1/sessions/:id/meals?dietary=&cookingTime=
///
/// Filtering never changes the stored result; indices refer to the full list.
async fn list_meals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MealFilterQuery>,
) -> Result<Json<FilteredMealsResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let filter = MealFilter::parse(query.dietary.as_deref(), query.cooking_time.as_deref())
        .map_err(ApiError::BadRequest)?;

    let session = state.sessions.get(id).await?;
    let result = session
        .result
        .ok_or_else(|| ApiError::Conflict("No recommendations yet".to_string()))?;

    let meals: Vec<IndexedMeal> = filter
        .apply(result.meals())
        .map(|(index, meal)| IndexedMeal {
            index,
            meal: meal.clone(),
        })
        .collect();

    Ok(Json(FilteredMealsResponse {
        total: result.meals().len(),
        meals,
    }))
}

/// GET /api/v1/sessions/:id/meals/:index/charts - Chart data for one meal
async fn meal_charts(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<MealChartsResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let session = state.sessions.get(id).await?;

    let meal = session
        .result
        .as_ref()
        .and_then(|result| result.meals().get(index))
        .ok_or_else(|| ApiError::NotFound(format!("Meal {} not found", index)))?;

    Ok(Json(MealCharts::for_meal(meal)))
}

/// GET /api/v1/sessions/:id/export - Download the meal plan as PDF
async fn export_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&id)?;
    let session = state.sessions.get(id).await?;

    let profile = session
        .profile
        .ok_or_else(|| ApiError::Conflict("No profile has been submitted".to_string()))?;
    let meals = session
        .result
        .map(|result| result.meals().to_vec())
        .filter(|meals| !meals.is_empty())
        .ok_or_else(|| ApiError::Conflict("No meals to export".to_string()))?;

    let file_name = export_file_name(&profile.name);
    let layout = layout_document(&profile, &meals, Utc::now());

    let pdf = tokio::task::spawn_blocking(move || render_pdf(&layout))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("PDF task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!(session_id = %id, bytes = pdf.len(), "Exported meal plan");

    let disposition = format!("attachment; filename=\"{}\"", header_safe(&file_name));
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid file name: {}", e)))?,
    );

    Ok((headers, pdf))
}

/// Keep a file name inside its quoted header parameter
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_replaces_quotes() {
        assert_eq!(header_safe("Jo \"JJ\" Smith"), "Jo _JJ_ Smith");
        assert_eq!(header_safe("a\\b\nc"), "a_b_c");
        assert_eq!(header_safe("Zoë"), "Zoë");
    }

    #[test]
    fn test_parse_session_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_session_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_session_id("not-a-uuid"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
