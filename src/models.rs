use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Threat indicator as held by the store.
///
/// Field aliases accept the platform export names (`score`, `investigationIDs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub value: String,
    #[serde(alias = "type")]
    pub indicator_type: String,
    #[serde(default, alias = "score")]
    pub reputation_score: f64,
    #[serde(default, alias = "investigationIDs")]
    pub incident_ids: Vec<String>,
}

impl Indicator {
    /// Whether this indicator is associated with the given incident
    pub fn involves(&self, incident_id: &str) -> bool {
        self.incident_ids.iter().any(|id| id == incident_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub status: u8,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Row of the mutual indicators audit table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutualIndicator {
    pub id: String,
    pub value: String,
    pub indicator_type: String,
    pub reputation_score: f64,
    pub reputation: String,
    pub involved_incidents_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarIncident {
    pub incident_id: String,
    pub score: f64,
    pub identical_indicators: Vec<String>,
    pub identical_indicator_values: Vec<String>,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualIncident {
    pub incident_id: String,
    pub indicator_values: Vec<String>,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub incident_id: String,
    pub generated_at: String,
    pub actual_incident: Option<ActualIncident>,
    pub mutual_indicators: Vec<MutualIndicator>,
    pub similar_incidents: Vec<SimilarIncident>,
}

impl SimilarityReport {
    pub fn empty(incident_id: impl Into<String>) -> Self {
        Self {
            incident_id: incident_id.into(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            actual_incident: None,
            mutual_indicators: Vec::new(),
            similar_incidents: Vec::new(),
        }
    }
}
