//! Common test utilities for integration tests
//!
//! Every test gets its own router and in-memory session store; nothing is
//! shared between tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use healer_backend::{
    config::AppConfig,
    routes,
    services::generator::{DisabledGenerator, GeminiClient, MealGenerator},
    state::AppState,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
}

/// Raw response for non-JSON bodies
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestApp {
    /// Application without a generation backend
    pub fn new() -> Self {
        Self::with_generator(Arc::new(DisabledGenerator))
    }

    pub fn with_generator(generator: Arc<dyn MealGenerator>) -> Self {
        let state = AppState::with_generator(AppConfig::default(), generator);
        Self {
            app: routes::create_router(state),
        }
    }

    /// Application generating through a Gemini-compatible server at `base_url`
    pub fn with_gemini(base_url: &str) -> Self {
        Self::with_generator(Arc::new(GeminiClient::new(
            base_url,
            "test-model",
            SecretString::new("test-key".to_string()),
        )))
    }

    async fn send(&self, request: Request<Body>) -> RawResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        RawResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let raw = self.get_raw(path).await;
        (raw.status, String::from_utf8(raw.body).unwrap())
    }

    /// Make a GET request keeping headers and bytes
    pub async fn get_raw(&self, path: &str) -> RawResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let raw = self.send(request).await;
        (raw.status, String::from_utf8(raw.body).unwrap())
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let raw = self.send(request).await;
        (raw.status, String::from_utf8(raw.body).unwrap())
    }

    /// Create a session and return its id
    pub async fn create_session(&self) -> String {
        let (status, body) = self.post("/api/v1/sessions", "").await;
        assert_eq!(status, StatusCode::OK);
        json_body(&body)["id"].as_str().unwrap().to_string()
    }
}

pub fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid JSON {:?}: {}", body, e))
}

/// Minimal valid profile form
pub fn basic_form() -> Value {
    json!({
        "name": "A",
        "age": "30",
        "gender": "Male",
        "height": "175",
        "weight": "70"
    })
}

/// A generated meal in the reply schema
pub fn generated_meal(name: &str, dietary: &str, cooking_time: &str) -> Value {
    json!({
        "name": name,
        "dietaryPreference": dietary,
        "cookingTime": cooking_time,
        "totalCalories": 420,
        "ingredients": ["1 cup quinoa", "1 cup broccoli"],
        "ingredientCalories": { "quinoa": 222, "broccoli": 31 },
        "nutrients": { "protein": 16, "carbs": 55, "fats": 8, "fiber": 9, "sugar": 4, "sodium": 310 },
        "steps": ["Rinse quinoa", "Steam broccoli", "Combine"],
        "keyBenefits": "Complete protein",
        "whyThisHelps": "Steady energy release",
        "matchScore": 91
    })
}

/// Gemini `generateContent` reply wrapping `text`
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}
