//! Session controller
//!
//! A session walks the form/results flow: submit a profile, receive meals,
//! retry or reset. Every submit, retry and reset takes a new generation
//! ticket; a finished request is applied only while its ticket is still the
//! session's latest, so late answers never overwrite newer state.
//!
//! Sessions live in memory. Any access keeps a session alive; a background
//! sweep drops the ones left idle longer than the configured TTL.

use super::recommendation::RecommendationService;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use healer_shared::{
    normalize, HealthProfile, RawProfileForm, RecommendationResult, SessionResponse,
    SessionStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

/// State of one session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub status: SessionStatus,
    pub generation: u64,
    pub profile: Option<HealthProfile>,
    pub result: Option<RecommendationResult>,
    pub updated_at: DateTime<Utc>,
    /// Last time the session was read or written
    last_active: Instant,
}

impl Session {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            status: SessionStatus::Editing,
            generation: 0,
            profile: None,
            result: None,
            updated_at: Utc::now(),
            last_active: Instant::now(),
        }
    }

    pub fn to_response(&self) -> SessionResponse {
        SessionResponse {
            id: self.id.to_string(),
            status: self.status,
            generation: self.generation,
            profile: self.profile.clone(),
            result: self.result.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// In-memory session map
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new(Uuid::new_v4());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_active = Instant::now();
        Some(session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many went
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_active.elapsed() <= max_idle);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Store a profile and take a new ticket; drops the previous result
    pub async fn begin_generation(&self, id: Uuid, profile: HealthProfile) -> Option<u64> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.generation += 1;
        session.status = SessionStatus::Generating;
        session.profile = Some(profile);
        session.result = None;
        session.updated_at = Utc::now();
        session.last_active = Instant::now();
        Some(session.generation)
    }

    /// Apply a finished generation if its ticket is still current
    ///
    /// Returns whether the result was applied.
    pub async fn complete_generation(
        &self,
        id: Uuid,
        ticket: u64,
        result: RecommendationResult,
    ) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if session.generation == ticket => {
                session.status = SessionStatus::Ready;
                session.result = Some(result);
                session.updated_at = Utc::now();
                session.last_active = Instant::now();
                true
            }
            _ => false,
        }
    }

    /// Back to an empty form; in-flight generations become stale
    pub async fn reset(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.generation += 1;
        session.status = SessionStatus::Editing;
        session.profile = None;
        session.result = None;
        session.updated_at = Utc::now();
        session.last_active = Instant::now();
        Some(session.clone())
    }
}

/// Session operations exposed to the HTTP layer
#[derive(Clone)]
pub struct SessionService {
    store: SessionStore,
    recommendations: RecommendationService,
}

impl SessionService {
    pub fn new(store: SessionStore, recommendations: RecommendationService) -> Self {
        Self {
            store,
            recommendations,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub async fn create(&self) -> SessionResponse {
        let session = self.store.create().await;
        info!(session_id = %session.id, "Session created");
        session.to_response()
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, ApiError> {
        self.store.get(id).await.ok_or_else(|| not_found(id))
    }

    /// Normalize a form and generate recommendations for it
    ///
    /// A form that fails validation leaves the session untouched.
    pub async fn submit(&self, id: Uuid, form: &RawProfileForm) -> Result<SessionResponse, ApiError> {
        self.get(id).await?;
        let profile = normalize(form).map_err(|err| {
            metrics::counter!("healer_validation_failures_total").increment(1);
            ApiError::from(err)
        })?;
        info!(session_id = %id, bmi = %profile.bmi, "Profile submitted");
        self.generate(id, profile).await
    }

    /// Generate again for the last submitted profile
    pub async fn retry(&self, id: Uuid) -> Result<SessionResponse, ApiError> {
        let profile = self
            .get(id)
            .await?
            .profile
            .ok_or_else(|| ApiError::Conflict("No profile has been submitted".to_string()))?;
        info!(session_id = %id, "Retrying recommendations");
        self.generate(id, profile).await
    }

    /// Discard profile and result
    pub async fn reset(&self, id: Uuid) -> Result<SessionResponse, ApiError> {
        let session = self.store.reset(id).await.ok_or_else(|| not_found(id))?;
        info!(session_id = %id, "Session reset");
        Ok(session.to_response())
    }

    /// Forget a session entirely
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.remove(id).await {
            return Err(not_found(id));
        }
        info!(session_id = %id, "Session deleted");
        Ok(())
    }

    async fn generate(&self, id: Uuid, profile: HealthProfile) -> Result<SessionResponse, ApiError> {
        let ticket = self
            .store
            .begin_generation(id, profile.clone())
            .await
            .ok_or_else(|| not_found(id))?;

        let result = self.recommendations.request_recommendations(&profile).await;

        if !self.store.complete_generation(id, ticket, result).await {
            debug!(session_id = %id, ticket, "Discarded stale recommendations");
        }
        Ok(self.get(id).await?.to_response())
    }
}

/// Periodically evict sessions idle for longer than `max_idle`
pub fn spawn_idle_sweep(
    store: SessionStore,
    max_idle: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(max_idle).await;
            if evicted > 0 {
                let remaining = store.len().await;
                info!(evicted, remaining, "Evicted idle sessions");
            }
        }
    })
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Session {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generator::DisabledGenerator;
    use healer_shared::{MealSource, MEALS_PER_PLAN};

    fn service() -> SessionService {
        SessionService::new(
            SessionStore::new(),
            RecommendationService::new(Arc::new(DisabledGenerator)),
        )
    }

    fn form() -> RawProfileForm {
        RawProfileForm {
            name: Some("A".to_string()),
            age: Some(30.0.into()),
            gender: Some("Male".to_string()),
            height: Some(175.0.into()),
            weight: Some(70.0.into()),
            ..Default::default()
        }
    }

    fn profile() -> HealthProfile {
        normalize(&form()).unwrap()
    }

    #[tokio::test]
    async fn test_submit_stores_profile_and_result() {
        let service = service();
        let id: Uuid = service.create().await.id.parse().unwrap();

        let session = service.submit(id, &form()).await.unwrap();
        assert_eq!(session.status, SessionStatus::Ready);
        assert_eq!(session.generation, 1);
        assert_eq!(session.profile.unwrap().bmi.value, 22.9);

        let result = session.result.unwrap();
        assert_eq!(result.source(), Some(MealSource::Fallback));
        assert_eq!(result.meals().len(), MEALS_PER_PLAN);
    }

    #[tokio::test]
    async fn test_invalid_form_leaves_session_untouched() {
        let service = service();
        let id: Uuid = service.create().await.id.parse().unwrap();

        let mut bad = form();
        bad.age = None;
        let err = service.submit(id, &bad).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let session = service.get(id).await.unwrap();
        assert_eq!(session.generation, 0);
        assert!(session.profile.is_none());
    }

    #[tokio::test]
    async fn test_retry_requires_profile() {
        let service = service();
        let id: Uuid = service.create().await.id.parse().unwrap();

        assert!(matches!(service.retry(id).await, Err(ApiError::Conflict(_))));

        service.submit(id, &form()).await.unwrap();
        let session = service.retry(id).await.unwrap();
        assert_eq!(session.generation, 2);
        assert!(session.result.is_some());
    }

    #[tokio::test]
    async fn test_reset_discards_plan() {
        let service = service();
        let id: Uuid = service.create().await.id.parse().unwrap();
        service.submit(id, &form()).await.unwrap();

        let session = service.reset(id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Editing);
        assert!(session.profile.is_none());
        assert!(session.result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let service = service();
        let id = Uuid::new_v4();
        assert!(matches!(service.get(id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.reset(id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.submit(id, &form()).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stale_ticket_is_discarded() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        let first = store.begin_generation(id, profile()).await.unwrap();
        let second = store.begin_generation(id, profile()).await.unwrap();
        assert!(second > first);

        let stale = RecommendationResult::failure("stale");
        assert!(!store.complete_generation(id, first, stale).await);
        assert_eq!(store.get(id).await.unwrap().status, SessionStatus::Generating);

        let fresh = RecommendationResult::failure("fresh");
        assert!(store.complete_generation(id, second, fresh.clone()).await);
        assert_eq!(store.get(id).await.unwrap().result, Some(fresh));
    }

    #[tokio::test]
    async fn test_reset_invalidates_in_flight_generation() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        let ticket = store.begin_generation(id, profile()).await.unwrap();
        store.reset(id).await.unwrap();

        assert!(!store.complete_generation(id, ticket, RecommendationResult::failure("late")).await);
        let session = store.get(id).await.unwrap();
        assert_eq!(session.status, SessionStatus::Editing);
        assert!(session.result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new();
        let idle = store.create().await.id;
        let active = store.create().await.id;

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        store.get(active).await.unwrap();
        tokio::time::advance(Duration::from_secs(15 * 60)).await;

        assert_eq!(store.evict_idle(Duration::from_secs(30 * 60)).await, 1);
        assert!(store.get(idle).await.is_none());
        assert!(store.get(active).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_and_reset_do_not_accumulate() {
        let store = SessionStore::new();
        for _ in 0..1_000 {
            let id = store.create().await.id;
            store.reset(id).await.unwrap();
        }
        assert_eq!(store.len().await, 1_000);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.evict_idle(Duration::from_secs(60)).await, 1_000);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sweep_runs_periodically() {
        let store = SessionStore::new();
        store.create().await;

        let sweep = spawn_idle_sweep(store.clone(), Duration::from_secs(60), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(75)).await;

        assert_eq!(store.len().await, 0);
        sweep.abort();
    }

    #[tokio::test]
    async fn test_delete_session() {
        let service = service();
        let id: Uuid = service.create().await.id.parse().unwrap();

        service.delete(id).await.unwrap();
        assert!(matches!(service.get(id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.delete(id).await, Err(ApiError::NotFound(_))));
    }
}
