//! Overlap annotation and the mutual indicator audit table

use super::profile::{IndicatorProfile, Vocabulary};
use super::scorer::CandidateScore;
use crate::models::{Indicator, MutualIndicator};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub incident_id: String,
    pub score: f64,
    /// Shared indicator ids, in vocabulary order
    pub identical_indicators: Vec<String>,
}

/// Vocabulary ids the candidate also holds, in vocabulary order
pub fn identical_indicators(vocabulary: &Vocabulary, candidate: &IndicatorProfile) -> Vec<String> {
    vocabulary
        .iter()
        .filter(|id| candidate.contains(id))
        .map(str::to_string)
        .collect()
}

/// Attach shared indicators to each ranked candidate
pub fn annotate(
    ranked: &[CandidateScore],
    profiles: &[IndicatorProfile],
    vocabulary: &Vocabulary,
) -> Vec<ScoredCandidate> {
    let by_id: HashMap<&str, &IndicatorProfile> = profiles
        .iter()
        .map(|p| (p.incident_id.as_str(), p))
        .collect();

    ranked
        .iter()
        .map(|c| ScoredCandidate {
            incident_id: c.incident_id.clone(),
            score: c.score,
            identical_indicators: by_id
                .get(c.incident_id.as_str())
                .map(|p| identical_indicators(vocabulary, p))
                .unwrap_or_default(),
        })
        .collect()
}

/// Reputation label for a numeric indicator score
pub fn reputation_label(score: f64) -> &'static str {
    match score {
        s if s == 4.0 => "Critical",
        s if s == 3.0 => "Bad",
        s if s == 2.0 => "Suspicious",
        s if s == 1.0 => "Good",
        s if s == 0.5 => "Informational",
        s if s == 0.0 => "Unknown",
        _ => "None",
    }
}

/// Audit rows for the mutual indicators, worst reputation first, then by how
/// many candidate incidents each one appears in
pub fn mutual_indicator_audit(mutual: &[Indicator], candidate_ids: &[String]) -> Vec<MutualIndicator> {
    let mut rows: Vec<MutualIndicator> = mutual
        .iter()
        .map(|ind| MutualIndicator {
            id: ind.id.clone(),
            value: ind.value.clone(),
            indicator_type: ind.indicator_type.clone(),
            reputation_score: ind.reputation_score,
            reputation: reputation_label(ind.reputation_score).to_string(),
            involved_incidents_count: candidate_ids.iter().filter(|id| ind.involves(id)).count(),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.reputation_score
            .total_cmp(&a.reputation_score)
            .then(b.involved_incidents_count.cmp(&a.involved_incidents_count))
    });
    rows
}
