//! Health priorities derived from a profile
//!
//! The same rules drive the recommendation prompt and the "Health Priorities
//! Applied" section of the exported document.

use crate::profile::HealthProfile;
use serde::{Deserialize, Serialize};

/// Dietary priorities that apply to one profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPriorities {
    pub low_sodium: bool,
    pub high_fiber_low_fat: bool,
    pub low_glycemic: bool,
    pub excluded_allergens: Vec<String>,
    pub targeted_issues: Vec<String>,
}

impl HealthPriorities {
    pub fn from_profile(profile: &HealthProfile) -> Self {
        Self {
            low_sodium: profile.has_high_blood_pressure(),
            high_fiber_low_fat: profile.has_high_cholesterol(),
            low_glycemic: profile.has_glycemic_readings(),
            excluded_allergens: profile.allergies.clone(),
            targeted_issues: profile.health_issues.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// One sentence per applied priority, in document order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.low_sodium {
            lines.push(
                "Low sodium diet (<500mg per meal) for blood pressure management".to_string(),
            );
        }
        if self.high_fiber_low_fat {
            lines.push("High fiber, low saturated fat for cholesterol control".to_string());
        }
        if self.low_glycemic {
            lines.push("Low glycemic index foods for blood sugar management".to_string());
        }
        if !self.excluded_allergens.is_empty() {
            lines.push(format!(
                "Allergen-free: Excluded {}",
                self.excluded_allergens.join(", ")
            ));
        }
        if !self.targeted_issues.is_empty() {
            lines.push(format!(
                "Targeted nutrition for: {}",
                self.targeted_issues.join(", ")
            ));
        }
        lines
    }
}
