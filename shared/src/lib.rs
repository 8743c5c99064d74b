//! HEALER Shared Library
//!
//! Domain types shared by the backend and the WASM module: the health
//! profile and its normalizer, meal recommendations, filters, chart series,
//! and the API request/response types.

pub mod charts;
pub mod errors;
pub mod form;
pub mod health_metrics;
pub mod meals;
pub mod priorities;
pub mod profile;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use charts::*;
pub use errors::*;
pub use form::{FormNumber, RawProfileForm};
pub use health_metrics::*;
pub use meals::*;
pub use priorities::HealthPriorities;
pub use profile::*;
pub use types::*;
pub use validation::ValidationError;
