//! API request and response types

use crate::charts::MealCharts;
use crate::meals::{MealRecommendation, RecommendationResult};
use crate::profile::HealthProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Stateless meal plan: the normalized profile and its recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub profile: HealthProfile,
    pub result: RecommendationResult,
}

/// Where a session stands in the form/results flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No profile submitted, or the plan was reset
    Editing,
    /// A generation request is in flight
    Generating,
    /// The latest generation finished
    Ready,
}

/// Snapshot of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub status: SessionStatus,
    /// Ticket of the latest generation; older results are discarded
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<HealthProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RecommendationResult>,
    pub updated_at: DateTime<Utc>,
}

/// Meal filter query parameters ("All" when absent)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFilterQuery {
    pub dietary: Option<String>,
    pub cooking_time: Option<String>,
}

/// A meal together with its position in the full result list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedMeal {
    pub index: usize,
    pub meal: MealRecommendation,
}

/// Filtered view of a session's meals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredMealsResponse {
    pub meals: Vec<IndexedMeal>,
    pub total: usize,
}

/// Charts of one meal
pub type MealChartsResponse = MealCharts;
