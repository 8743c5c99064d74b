//! Integration tests for the session flow

mod common;

use axum::http::{header, StatusCode};
use common::{basic_form, json_body, TestApp};

async fn submitted_session(app: &TestApp) -> String {
    let id = app.create_session().await;
    let (status, body) = app
        .post(&format!("/api/v1/sessions/{}/submit", id), &basic_form().to_string())
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    id
}

#[tokio::test]
async fn test_new_session_is_editing() {
    let app = TestApp::new();
    let id = app.create_session().await;

    let (status, body) = app.get(&format!("/api/v1/sessions/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["status"], "editing");
    assert_eq!(json["generation"], 0);
    assert!(json.get("result").is_none());
}

#[tokio::test]
async fn test_submit_then_filter_meals() {
    let app = TestApp::new();
    let id = submitted_session(&app).await;

    let (status, body) = app.get(&format!("/api/v1/sessions/{}/meals", id)).await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["total"], 5);
    assert_eq!(json["meals"].as_array().unwrap().len(), 5);

    let (_, body) = app
        .get(&format!("/api/v1/sessions/{}/meals?dietary=Vegetarian", id))
        .await;
    let json = json_body(&body);
    let meals = json["meals"].as_array().unwrap();
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0]["index"], 3);

    let (_, body) = app
        .get(&format!(
            "/api/v1/sessions/{}/meals?dietary=Non-vegetarian&cookingTime=30-60min",
            id
        ))
        .await;
    let indices: Vec<u64> = json_body(&body)["meals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["index"].as_u64().unwrap())
        .collect();
    assert_eq!(indices, vec![2, 4]);
}

#[tokio::test]
async fn test_filter_rejects_unknown_values() {
    let app = TestApp::new();
    let id = submitted_session(&app).await;

    let (status, body) = app
        .get(&format!("/api/v1/sessions/{}/meals?dietary=Keto", id))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_meals_before_submit_conflict() {
    let app = TestApp::new();
    let id = app.create_session().await;

    let (status, _) = app.get(&format!("/api/v1/sessions/{}/meals", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post(&format!("/api/v1/sessions/{}/retry", id), "").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.get(&format!("/api/v1/sessions/{}/export", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_meal_charts() {
    let app = TestApp::new();
    let id = submitted_session(&app).await;

    let (status, body) = app
        .get(&format!("/api/v1/sessions/{}/meals/0/charts", id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["nutrients"]["labels"][1], "Carbohydrates");
    assert_eq!(json["nutrients"]["values"].as_array().unwrap().len(), 5);
    assert!(json["ingredientCalories"]["labels"].as_array().is_some());

    let (status, _) = app
        .get(&format!("/api/v1/sessions/{}/meals/5/charts", id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_pdf() {
    let app = TestApp::new();
    let id = submitted_session(&app).await;

    let response = app.get_raw(&format!("/api/v1/sessions/{}/export", id)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"A_HEALER_Meal_Plan.pdf\""
    );
    assert!(response.body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_retry_and_reset() {
    let app = TestApp::new();
    let id = submitted_session(&app).await;

    let (status, body) = app.post(&format!("/api/v1/sessions/{}/retry", id), "").await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["generation"], 2);
    assert_eq!(json["status"], "ready");

    let (status, body) = app.delete(&format!("/api/v1/sessions/{}/plan", id)).await;
    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["status"], "editing");
    assert!(json.get("profile").is_none());
    assert!(json.get("result").is_none());
}

#[tokio::test]
async fn test_invalid_submit_keeps_session() {
    let app = TestApp::new();
    let id = app.create_session().await;
    let mut form = basic_form();
    form["weight"] = serde_json::json!("-5");

    let (status, body) = app
        .post(&format!("/api/v1/sessions/{}/submit", id), &form.to_string())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["field"], "weight_kg");

    let (_, body) = app.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(json_body(&body)["generation"], 0);
}

#[tokio::test]
async fn test_unknown_and_malformed_session_ids() {
    let app = TestApp::new();

    let (status, _) = app
        .get(&format!("/api/v1/sessions/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/v1/sessions/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_session() {
    let app = TestApp::new();
    let id = submitted_session(&app).await;

    let (status, _) = app.delete(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.delete(&format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["error"]["code"], "NOT_FOUND");
}
