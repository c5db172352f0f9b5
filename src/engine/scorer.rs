//! Similarity scoring
//!
//! The score is the share of the target's total indicator weight that the
//! candidate reproduces. Indicators the candidate has beyond the target's
//! vocabulary do not count against it.

use super::profile::{IndicatorProfile, Vocabulary};
use super::weights::TermWeights;
use crate::errors::{KinshipError, KinshipResult};
use rayon::prelude::*;

/// Decimal places kept on every score
pub const SCORE_DECIMALS: i32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub incident_id: String,
    pub score: f64,
}

/// Round half to even at [`SCORE_DECIMALS`] places
pub fn round_score(raw: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (raw * factor).round_ties_even() / factor
}

/// Score one candidate against the target vocabulary
pub fn score(
    candidate: &IndicatorProfile,
    vocabulary: &Vocabulary,
    weights: &TermWeights,
) -> KinshipResult<f64> {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for id in vocabulary.iter() {
        let weight = weights
            .get(id)
            .ok_or_else(|| KinshipError::MissingWeight(id.to_string()))?;
        denominator += weight;
        if candidate.contains(id) {
            numerator += weight;
        }
    }
    Ok(round_score(numerator / denominator))
}

/// Score every candidate, in parallel, keeping candidate order
pub fn score_all(
    candidates: &[IndicatorProfile],
    vocabulary: &Vocabulary,
    weights: &TermWeights,
) -> KinshipResult<Vec<CandidateScore>> {
    candidates
        .par_iter()
        .map(|profile| {
            score(profile, vocabulary, weights).map(|score| CandidateScore {
                incident_id: profile.incident_id.clone(),
                score,
            })
        })
        .collect()
}
