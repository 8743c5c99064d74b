//! Recommendation service
//!
//! Builds the prompt, calls the configured [`MealGenerator`], parses its
//! reply, and falls back to the built-in catalog on any generation failure.
//! The caller always receives a [`RecommendationResult`]; generation errors
//! are logged and counted, never returned.

use super::fallback::fallback_meals;
use super::generator::MealGenerator;
use super::prompt::build_prompt;
use super::response::parse_meals;
use healer_shared::{HealthProfile, MealSource, RecommendationResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Recommendation service
#[derive(Clone)]
pub struct RecommendationService {
    generator: Arc<dyn MealGenerator>,
}

impl RecommendationService {
    pub fn new(generator: Arc<dyn MealGenerator>) -> Self {
        Self { generator }
    }

    /// Name of the backend in use
    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    /// Request meal recommendations for a profile
    ///
    /// Generated meals are used when the reply parses into at least one
    /// valid meal; otherwise the five fallback meals are returned.
    pub async fn request_recommendations(&self, profile: &HealthProfile) -> RecommendationResult {
        let started = Instant::now();
        let prompt = build_prompt(profile);

        let outcome = match self.generator.generate(&prompt).await {
            Ok(text) => parse_meals(&text),
            Err(err) => Err(err),
        };

        let result = match outcome {
            Ok(meals) => {
                info!(
                    generator = self.generator.name(),
                    meals = meals.len(),
                    "Generated meal recommendations"
                );
                RecommendationResult::from_meals(meals, MealSource::Generated)
            }
            Err(err) => {
                warn!(
                    generator = self.generator.name(),
                    reason = err.reason(),
                    error = %err,
                    "Generation failed, using fallback meals"
                );
                metrics::counter!("healer_fallbacks_total", "reason" => err.reason())
                    .increment(1);
                RecommendationResult::from_meals(fallback_meals(profile), MealSource::Fallback)
            }
        };

        let source = result.source().map(|s| s.as_str()).unwrap_or("none");
        metrics::counter!("healer_recommendations_total", "source" => source).increment(1);
        metrics::histogram!("healer_recommendation_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generator::DisabledGenerator;
    use crate::services::response::tests::{reply, wire_meal};
    use async_trait::async_trait;
    use healer_shared::{normalize, RawProfileForm, RecommendationError, MEALS_PER_PLAN};

    /// Generator answering with a canned reply
    struct CannedGenerator(Result<String, RecommendationError>);

    #[async_trait]
    impl MealGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, RecommendationError> {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn service(reply: Result<String, RecommendationError>) -> RecommendationService {
        RecommendationService::new(Arc::new(CannedGenerator(reply)))
    }

    fn profile() -> HealthProfile {
        normalize(&RawProfileForm {
            name: Some("Lena".to_string()),
            age: Some(38.0.into()),
            gender: Some("Female".to_string()),
            height: Some(170.0.into()),
            weight: Some(64.0.into()),
            bp_level: Some("High".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generated_meals_are_used() {
        let text = reply(vec![wire_meal("Dal", "15-30min"), wire_meal("Soup", "<15min")]);
        let result = service(Ok(text)).request_recommendations(&profile()).await;

        assert_eq!(result.source(), Some(MealSource::Generated));
        assert_eq!(result.meals().len(), 2);
        assert_eq!(result.meals()[1].name, "Soup");
    }

    #[tokio::test]
    async fn test_service_error_falls_back() {
        let result = service(Err(RecommendationError::Service("timeout".to_string())))
            .request_recommendations(&profile())
            .await;

        assert_eq!(result.source(), Some(MealSource::Fallback));
        assert_eq!(result.meals().len(), MEALS_PER_PLAN);
        // High blood pressure selects the low sodium figures
        assert_eq!(result.meals()[0].nutrients.sodium, Some(380.0));
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let result = service(Ok("Sorry, I can't do that.".to_string()))
            .request_recommendations(&profile())
            .await;
        assert_eq!(result.source(), Some(MealSource::Fallback));
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back() {
        let result = service(Ok(r#"{"meals": []}"#.to_string()))
            .request_recommendations(&profile())
            .await;
        assert_eq!(result.source(), Some(MealSource::Fallback));
        assert!(matches!(result, RecommendationResult::Success { .. }));
    }

    #[tokio::test]
    async fn test_disabled_generator_always_falls_back() {
        let service = RecommendationService::new(Arc::new(DisabledGenerator));
        assert_eq!(service.generator_name(), "disabled");

        let result = service.request_recommendations(&profile()).await;
        assert_eq!(result.source(), Some(MealSource::Fallback));
    }
}
