//! Term weighting over indicator ids.
//!
//! Each id gets `ln(1 + N / df)` where `N` is the number of candidate
//! profiles plus one for the target, and `df` is the number of candidate
//! profiles holding the id plus one if the target holds it. The extra count
//! keeps target-only ids finite: they get the largest weight, `ln(1 + N)`.

use super::profile::{IndicatorProfile, Vocabulary};
use std::collections::HashMap;

/// Weight per indicator id over the vocabulary and every candidate id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermWeights {
    corpus_size: usize,
    frequency: HashMap<String, usize>,
    weights: HashMap<String, f64>,
}

impl TermWeights {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.weights.get(id).copied()
    }

    /// Smoothed document frequency of an id
    pub fn frequency(&self, id: &str) -> Option<usize> {
        self.frequency.get(id).copied()
    }

    /// Candidate count plus the target
    pub fn corpus_size(&self) -> usize {
        self.corpus_size
    }
}

/// Learn weights from the candidate corpus and the target vocabulary
pub fn fit(candidates: &[IndicatorProfile], vocabulary: &Vocabulary) -> TermWeights {
    let corpus_size = candidates.len() + 1;

    let mut frequency: HashMap<String, usize> = HashMap::new();
    for profile in candidates {
        for id in profile.indicators() {
            *frequency.entry(id.clone()).or_insert(0) += 1;
        }
    }
    for id in vocabulary.iter() {
        *frequency.entry(id.to_string()).or_insert(0) += 1;
    }

    let weights = frequency
        .iter()
        .map(|(id, &df)| (id.clone(), idf(corpus_size, df)))
        .collect();

    log::debug!(
        "Fitted {} indicator weights over a corpus of {}",
        frequency.len(),
        corpus_size
    );

    TermWeights {
        corpus_size,
        frequency,
        weights,
    }
}

fn idf(corpus_size: usize, frequency: usize) -> f64 {
    (1.0 + corpus_size as f64 / frequency as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(ids: &[&str]) -> Vocabulary {
        Vocabulary::new(ids.iter().copied()).unwrap()
    }

    fn worked_corpus() -> Vec<IndicatorProfile> {
        vec![
            IndicatorProfile::with_indicators("C1", ["I1", "I2"]),
            IndicatorProfile::with_indicators("C2", ["I1"]),
            IndicatorProfile::with_indicators("C3", ["I4"]),
        ]
    }

    #[test]
    fn test_worked_example_weights() {
        let weights = fit(&worked_corpus(), &vocab(&["I1", "I2", "I3"]));
        assert_eq!(weights.corpus_size(), 4);
        assert_eq!(weights.frequency("I1"), Some(3));
        assert_eq!(weights.frequency("I2"), Some(2));
        assert_eq!(weights.frequency("I3"), Some(1));
        assert_eq!(weights.frequency("I4"), Some(1));

        assert!((weights.get("I1").unwrap() - (1.0f64 + 4.0 / 3.0).ln()).abs() < 1e-12);
        assert!((weights.get("I2").unwrap() - 3.0f64.ln()).abs() < 1e-12);
        assert!((weights.get("I3").unwrap() - 5.0f64.ln()).abs() < 1e-12);
        assert_eq!(weights.get("I5"), None);
    }

    #[test]
    fn test_target_only_gets_max_weight() {
        let weights = fit(&worked_corpus(), &vocab(&["I1", "I2", "I3"]));
        let max = (1.0 + weights.corpus_size() as f64).ln();
        assert!((weights.get("I3").unwrap() - max).abs() < 1e-12);
        assert!(weights.get("I1").unwrap() < max);
    }

    #[test]
    fn test_weight_decreases_with_frequency() {
        let corpus = vec![
            IndicatorProfile::with_indicators("C1", ["rare", "common"]),
            IndicatorProfile::with_indicators("C2", ["common"]),
            IndicatorProfile::with_indicators("C3", ["common"]),
        ];
        let weights = fit(&corpus, &vocab(&["rare", "common"]));
        assert!(weights.frequency("rare").unwrap() < weights.frequency("common").unwrap());
        assert!(weights.get("rare").unwrap() > weights.get("common").unwrap());
    }

    #[test]
    fn test_empty_corpus() {
        let weights = fit(&[], &vocab(&["I1"]));
        assert_eq!(weights.corpus_size(), 1);
        assert!((weights.get("I1").unwrap() - 2.0f64.ln()).abs() < 1e-12);
    }
}
