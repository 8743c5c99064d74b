//! Business logic services
//!
//! Services encapsulate the recommendation flow and coordinate between
//! the session store and the external generation service.

pub mod export;
pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod recommendation;
pub mod response;
pub mod session;

pub use recommendation::RecommendationService;
pub use session::{SessionService, SessionStore};
