//! Error types for HEALER recommendation generation

use thiserror::Error;

/// Why a generation attempt did not produce usable meals
///
/// None of these reach the user directly; the recommendation service answers
/// every one of them with the fallback catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("Generation service error: {0}")]
    Service(String),

    #[error("Malformed generation response: {0}")]
    Parse(String),

    #[error("Generation returned no meals")]
    EmptyResult,
}

impl RecommendationError {
    /// Short label for metrics and logs
    pub fn reason(&self) -> &'static str {
        match self {
            RecommendationError::Service(_) => "service",
            RecommendationError::Parse(_) => "parse",
            RecommendationError::EmptyResult => "empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reasons() {
        assert_eq!(RecommendationError::Service("timeout".into()).reason(), "service");
        assert_eq!(RecommendationError::Parse("no JSON".into()).reason(), "parse");
        assert_eq!(RecommendationError::EmptyResult.to_string(), "Generation returned no meals");
    }
}
