//! LLM-generated taste profile

use serde::{Deserialize, Serialize};

/// Result of analysing a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteProfile {
    pub favorite_genre: String,
    #[serde(rename = "totalHoursEstimates")]
    pub total_hours_estimate: f64,
    pub personality_profile: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}
