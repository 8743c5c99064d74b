//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! All fields are cheap to clone: the configuration sits behind an `Arc`,
//! the generator is an `Arc<dyn MealGenerator>` and the session map is an
//! `Arc<RwLock<..>>`.

use crate::config::AppConfig;
use crate::services::generator::{self, MealGenerator};
use crate::services::{RecommendationService, SessionService, SessionStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub recommendations: RecommendationService,
    pub sessions: SessionService,
    /// Prometheus recorder handle; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state with the generator described by the configuration
    pub fn new(config: AppConfig) -> Self {
        let generator = generator::from_config(&config.ai);
        Self::with_generator(config, generator)
    }

    /// Create state around an explicit generator
    pub fn with_generator(config: AppConfig, generator: Arc<dyn MealGenerator>) -> Self {
        let recommendations = RecommendationService::new(generator);
        let sessions = SessionService::new(SessionStore::new(), recommendations.clone());

        Self {
            config: Arc::new(config),
            recommendations,
            sessions,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_without_key_uses_disabled_generator() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.recommendations.generator_name(), "disabled");
        assert!(state.metrics.is_none());

        // Clones share the session map
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
    }
}
