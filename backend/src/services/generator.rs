//! Text-generation backends
//!
//! [`MealGenerator`] is the seam between the recommendation service and the
//! external model. [`GeminiClient`] talks to the Gemini `generateContent`
//! endpoint; [`DisabledGenerator`] stands in when no API key is configured.

use crate::config::AiConfig;
use async_trait::async_trait;
use healer_shared::RecommendationError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A backend that turns a prompt into raw reply text
#[async_trait]
pub trait MealGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RecommendationError>;

    /// Backend name for logs and metrics
    fn name(&self) -> &'static str;
}

/// Build the generator described by the configuration
pub fn from_config(config: &AiConfig) -> Arc<dyn MealGenerator> {
    match &config.api_key {
        Some(key) if config.generation_enabled() => Arc::new(GeminiClient::new(
            &config.base_url,
            &config.model,
            key.clone(),
        )),
        _ => Arc::new(DisabledGenerator),
    }
}

// ============================================================================
// Gemini
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: SecretString,
    client: Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl MealGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, RecommendationError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini API request failed: {}", e);
                RecommendationError::Service(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {} - {}", status, error_text);
            return Err(RecommendationError::Service(format!(
                "API returned {}",
                status
            )));
        }

        let body: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to decode Gemini response: {}", e);
            RecommendationError::Service(format!("undecodable response: {}", e))
        })?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RecommendationError::Service(
                "response carried no text".to_string(),
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// ============================================================================
// Disabled
// ============================================================================

/// Generator used when no API key is configured; always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

impl DisabledGenerator {
    pub const NAME: &'static str = "disabled";
}

#[async_trait]
impl MealGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, RecommendationError> {
        Err(RecommendationError::Service(
            "generation is not configured".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
