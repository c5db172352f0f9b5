//! Indicator profiles
//!
//! Turns indicator-to-incident associations into one bag of indicator ids per
//! incident.

use crate::fetch::TargetIndicators;
use crate::models::Indicator;
use std::collections::HashSet;

/// Indicator ids of the target incident, in target order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    ids: Vec<String>,
}

impl Vocabulary {
    /// Returns `None` for an empty id list. Duplicate ids keep their first position.
    pub fn new<I, S>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if seen.insert(id.clone()) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            None
        } else {
            Some(Self { ids: unique })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorProfile {
    pub incident_id: String,
    indicators: Vec<String>,
    lookup: HashSet<String>,
}

impl IndicatorProfile {
    pub fn new(incident_id: impl Into<String>) -> Self {
        Self {
            incident_id: incident_id.into(),
            indicators: Vec::new(),
            lookup: HashSet::new(),
        }
    }

    pub fn with_indicators<I, S>(incident_id: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut profile = Self::new(incident_id);
        for id in ids {
            profile.insert(id);
        }
        profile
    }

    /// Adds an indicator id; repeats are ignored
    pub fn insert(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.lookup.insert(id.clone()) {
            self.indicators.push(id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

/// Vocabulary of the target incident, or `None` when it has no indicators
pub fn build_target_vocabulary(target: &TargetIndicators) -> Option<Vocabulary> {
    Vocabulary::new(target.iter().map(|ind| ind.id.clone()))
}

/// One profile per candidate incident, in candidate order.
///
/// The target incident is skipped. A candidate none of the mutual indicators
/// point at still gets an (empty) profile.
pub fn build_candidate_profiles(
    target_incident_id: &str,
    candidate_ids: &[String],
    mutual_indicators: &[Indicator],
) -> Vec<IndicatorProfile> {
    candidate_ids
        .iter()
        .filter(|id| id.as_str() != target_incident_id)
        .map(|incident_id| {
            IndicatorProfile::with_indicators(
                incident_id.clone(),
                mutual_indicators
                    .iter()
                    .filter(|ind| ind.involves(incident_id))
                    .map(|ind| ind.id.clone()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(id: &str, incidents: &[&str]) -> Indicator {
        Indicator {
            id: id.to_string(),
            value: String::new(),
            indicator_type: "IP".to_string(),
            reputation_score: 0.0,
            incident_ids: incidents.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_vocabulary_is_none() {
        assert!(Vocabulary::new(Vec::<String>::new()).is_none());
        assert!(build_target_vocabulary(&TargetIndicators::default()).is_none());
    }

    #[test]
    fn test_vocabulary_keeps_target_order() {
        let target = TargetIndicators::new(vec![indicator("z", &[]), indicator("a", &[]), indicator("z", &[])]);
        let vocab = build_target_vocabulary(&target).unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_large_vocabulary_dedupes_in_order() {
        let ids: Vec<String> = (0..20_000).chain(0..20_000).map(|i| format!("ind-{}", i)).collect();
        let vocab = Vocabulary::new(ids).unwrap();
        assert_eq!(vocab.len(), 20_000);
        assert_eq!(vocab.iter().next(), Some("ind-0"));
        assert_eq!(vocab.iter().last(), Some("ind-19999"));
    }

    #[test]
    fn test_candidate_profiles() {
        let mutual = vec![
            indicator("I1", &["t", "C1", "C2"]),
            indicator("I2", &["t", "C1"]),
        ];
        let candidates: Vec<String> = ["t", "C1", "C2", "C3"].iter().map(|s| s.to_string()).collect();
        let profiles = build_candidate_profiles("t", &candidates, &mutual);

        assert_eq!(profiles.len(), 3, "target incident is excluded");
        assert_eq!(profiles[0].incident_id, "C1");
        assert_eq!(profiles[0].indicators(), &["I1".to_string(), "I2".to_string()]);
        assert_eq!(profiles[1].indicators(), &["I1".to_string()]);
        assert!(profiles[2].is_empty(), "unmatched candidate keeps an empty profile");
    }

    #[test]
    fn test_profile_ignores_repeats() {
        let profile = IndicatorProfile::with_indicators("C1", ["I2", "I1", "I2", "I1"]);
        assert_eq!(profile.indicators(), &["I2".to_string(), "I1".to_string()]);
        assert!(profile.contains("I1"));
        assert!(!profile.contains("I3"));
    }
}
