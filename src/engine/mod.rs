//! Similarity Engine
//!
//! Ranks past incidents by the indicators they share with a target incident.
//! Split into submodules, each feeding the next:
//! - `profile`: per-incident bags of indicator ids
//! - `weights`: smoothed inverse-frequency weight per indicator id
//! - `scorer`: weighted share of the target's indicators a candidate holds
//! - `rank`: threshold, sort and truncate
//! - `overlap`: shared indicators per result and the mutual indicator audit

pub mod overlap;
pub mod profile;
pub mod rank;
pub mod scorer;
pub mod weights;

pub use overlap::ScoredCandidate;
pub use profile::{IndicatorProfile, Vocabulary};
pub use scorer::CandidateScore;
pub use weights::TermWeights;

use crate::config::SimilarityConfig;
use crate::enrich;
use crate::errors::{KinshipError, KinshipResult};
use crate::fetch::{self, MUTUAL_INDICATOR_LIMIT};
use crate::models::SimilarityReport;
use crate::store::IncidentStore;
use std::time::Instant;

/// Fit, score, rank and annotate the candidates against the vocabulary
pub fn rank_candidates(
    candidates: &[IndicatorProfile],
    vocabulary: &Vocabulary,
    threshold: f64,
    max_results: usize,
) -> KinshipResult<Vec<ScoredCandidate>> {
    let weights = weights::fit(candidates, vocabulary);
    let scored = scorer::score_all(candidates, vocabulary, &weights)?;
    let ranked = rank::apply(scored, threshold, max_results);
    Ok(overlap::annotate(&ranked, candidates, vocabulary))
}

pub struct SimilarityEngine<'a, S: IncidentStore + ?Sized> {
    store: &'a S,
    config: SimilarityConfig,
}

impl<'a, S: IncidentStore + ?Sized> SimilarityEngine<'a, S> {
    pub fn new(store: &'a S, config: SimilarityConfig) -> Self {
        Self { store, config }
    }

    /// Run the full pipeline for one target incident
    pub fn run(&self, incident_id: &str) -> KinshipResult<SimilarityReport> {
        let start_time = Instant::now();
        log::info!("Finding incidents similar to {}", incident_id);

        let mut report = SimilarityReport::empty(incident_id);

        let target = fetch::fetch_target_indicators(self.store, incident_id, &self.config)?;
        let vocabulary = match profile::build_target_vocabulary(&target) {
            Some(v) => v,
            None => {
                log::info!("Not enough indicators on incident {}, nothing to compare", incident_id);
                return Ok(report);
            }
        };

        let related = fetch::fetch_related_incident_ids(
            self.store,
            &target,
            self.config.query.as_ref(),
            self.config.from_date,
        )?;
        let candidate_ids: Vec<String> = related
            .into_iter()
            .filter(|id| id != incident_id)
            .collect();
        if candidate_ids.is_empty() {
            log::info!("No related incidents found for {}", incident_id);
            return Ok(report);
        }

        let mutual =
            fetch::fetch_mutual_indicators(self.store, &candidate_ids, &target, MUTUAL_INDICATOR_LIMIT)?;
        report.mutual_indicators = overlap::mutual_indicator_audit(&mutual, &candidate_ids);

        let profiles = profile::build_candidate_profiles(incident_id, &candidate_ids, &mutual);
        log::debug!(
            "Scoring {} candidates against {} target indicators",
            profiles.len(),
            vocabulary.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.thread_count())
            .build()
            .map_err(|e| KinshipError::ThreadPool(e.to_string()))?;
        // Keep `self` out of the pool closure so the store need not be Sync.
        let (threshold, max_results) = (self.config.threshold, self.config.max_results);
        let similar =
            pool.install(|| rank_candidates(&profiles, &vocabulary, threshold, max_results))?;

        log::info!(
            "{} of {} candidates scored above {}",
            similar.len(),
            profiles.len(),
            threshold
        );

        report.similar_incidents =
            enrich::enrich_similar(self.store, &similar, &target, &self.config.fields_to_display)?;

        if self.config.show_actual_incident && !report.similar_incidents.is_empty() {
            report.actual_incident = Some(enrich::enrich_actual(
                self.store,
                incident_id,
                &target,
                &self.config.fields_to_display,
            )?);
        }

        log::info!(
            "Similarity run completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    fn thread_count(&self) -> usize {
        if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Indicator, IncidentRecord};
    use crate::store::{IncidentQuery, Snapshot, SnapshotStore};
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::Cell;
    use std::collections::BTreeMap;

    fn indicator(id: &str, incidents: &[&str]) -> Indicator {
        Indicator {
            id: id.to_string(),
            value: format!("{}.example", id.to_lowercase()),
            indicator_type: "Domain".to_string(),
            reputation_score: 2.0,
            incident_ids: incidents.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn incident(id: &str) -> IncidentRecord {
        IncidentRecord {
            id: id.to_string(),
            name: format!("Incident {}", id),
            created: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            status: 1,
            fields: BTreeMap::new(),
        }
    }

    /// Target T holds I1..I3; C1={I1,I2}, C2={I1}, C3={I3}.
    fn worked_store() -> SnapshotStore {
        SnapshotStore::new(Snapshot {
            indicators: vec![
                indicator("I1", &["T", "C1", "C2"]),
                indicator("I2", &["T", "C1"]),
                indicator("I3", &["T", "C3"]),
            ],
            incidents: ["T", "C1", "C2", "C3"].iter().map(|id| incident(id)).collect(),
        })
        .unwrap()
    }

    #[test]
    fn test_rank_candidates_worked_example() {
        let candidates = vec![
            IndicatorProfile::with_indicators("C1", ["I1", "I2"]),
            IndicatorProfile::with_indicators("C2", ["I1"]),
            IndicatorProfile::with_indicators("C3", ["I4"]),
        ];
        let vocab = Vocabulary::new(["I1", "I2", "I3"]).unwrap();
        let ranked = rank_candidates(&candidates, &vocab, 0.2, 10).unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!((ranked[0].incident_id.as_str(), ranked[0].score), ("C1", 0.55));
        assert_eq!(ranked[0].identical_indicators, vec!["I1", "I2"]);
        assert_eq!((ranked[1].incident_id.as_str(), ranked[1].score), ("C2", 0.24));
        assert_eq!(ranked[1].identical_indicators, vec!["I1"]);
    }

    #[test]
    fn test_engine_run_ranks_candidates() {
        let store = worked_store();
        let config = SimilarityConfig {
            threshold: 0.1,
            threads: 2,
            show_actual_incident: true,
            ..SimilarityConfig::default()
        };
        let report = SimilarityEngine::new(&store, config).run("T").unwrap();

        let ids: Vec<&str> = report.similar_incidents.iter().map(|s| s.incident_id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C3", "C2"]);
        let scores: Vec<f64> = report.similar_incidents.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![0.64, 0.36, 0.28]);
        assert_eq!(report.similar_incidents[0].identical_indicator_values, vec!["i1.example", "i2.example"]);
        assert_eq!(report.similar_incidents[1].fields["name"], "Incident C3");
        assert_eq!(report.similar_incidents[1].fields["created"], "2024-04-01");
        assert_eq!(report.mutual_indicators.len(), 3);
        assert!(report.actual_incident.is_some());
    }

    #[test]
    fn test_engine_insufficient_signal() {
        let store = worked_store();
        let config = SimilarityConfig {
            min_indicator_count: 5,
            ..SimilarityConfig::default()
        };
        let report = SimilarityEngine::new(&store, config).run("T").unwrap();
        assert!(report.similar_incidents.is_empty());
        assert!(report.mutual_indicators.is_empty());
    }

    #[test]
    fn test_engine_no_related_incidents() {
        let store = SnapshotStore::new(Snapshot {
            indicators: vec![indicator("I1", &["T"]), indicator("I2", &["T"])],
            incidents: vec![incident("T")],
        })
        .unwrap();
        let report = SimilarityEngine::new(&store, SimilarityConfig::default()).run("T").unwrap();
        assert!(report.similar_incidents.is_empty());
        assert!(report.actual_incident.is_none());
    }

    #[test]
    fn test_engine_query_narrows_candidates() {
        let store = worked_store();
        let config = SimilarityConfig {
            threshold: 0.0,
            query: Some(IncidentQuery::parse("id:C2").unwrap()),
            ..SimilarityConfig::default()
        };
        let report = SimilarityEngine::new(&store, config).run("T").unwrap();
        let ids: Vec<&str> = report.similar_incidents.iter().map(|s| s.incident_id.as_str()).collect();
        assert_eq!(ids, vec!["C2"]);
    }

    /// Counts lookups through a `Cell`, so it is not `Sync`
    struct CountingStore {
        inner: SnapshotStore,
        calls: Cell<usize>,
    }

    impl IncidentStore for CountingStore {
        fn find_indicators(&self, incident_id: &str) -> KinshipResult<Vec<Indicator>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.find_indicators(incident_id)
        }

        fn search_incident_ids(
            &self,
            incident_ids: &[String],
            query: Option<&IncidentQuery>,
            from_date: Option<DateTime<Utc>>,
        ) -> KinshipResult<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.search_incident_ids(incident_ids, query, from_date)
        }

        fn find_mutual_indicators(
            &self,
            indicator_ids: &[String],
            incident_ids: &[String],
            limit: usize,
        ) -> KinshipResult<Vec<Indicator>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.find_mutual_indicators(indicator_ids, incident_ids, limit)
        }

        fn get_incidents(&self, incident_ids: &[String]) -> KinshipResult<Vec<IncidentRecord>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.get_incidents(incident_ids)
        }
    }

    #[test]
    fn test_engine_runs_over_non_sync_store() {
        let store = CountingStore {
            inner: worked_store(),
            calls: Cell::new(0),
        };
        let config = SimilarityConfig {
            threshold: 0.1,
            threads: 4,
            ..SimilarityConfig::default()
        };
        let report = SimilarityEngine::new(&store, config).run("T").unwrap();

        let ids: Vec<&str> = report.similar_incidents.iter().map(|s| s.incident_id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C3", "C2"]);
        assert_eq!(store.calls.get(), 3, "no search without a query or date filter");
    }

    struct FailingStore;

    impl IncidentStore for FailingStore {
        fn find_indicators(&self, _incident_id: &str) -> KinshipResult<Vec<Indicator>> {
            Err(KinshipError::store("find_indicators", "unreachable"))
        }

        fn search_incident_ids(
            &self,
            _incident_ids: &[String],
            _query: Option<&IncidentQuery>,
            _from_date: Option<DateTime<Utc>>,
        ) -> KinshipResult<Vec<String>> {
            unreachable!("no search after a failed fetch")
        }

        fn find_mutual_indicators(
            &self,
            _indicator_ids: &[String],
            _incident_ids: &[String],
            _limit: usize,
        ) -> KinshipResult<Vec<Indicator>> {
            unreachable!("no mutual lookup after a failed fetch")
        }

        fn get_incidents(&self, _incident_ids: &[String]) -> KinshipResult<Vec<IncidentRecord>> {
            unreachable!("no enrichment after a failed fetch")
        }
    }

    #[test]
    fn test_store_failure_propagates() {
        let err = SimilarityEngine::new(&FailingStore, SimilarityConfig::default())
            .run("T")
            .unwrap_err();
        assert!(matches!(err, KinshipError::Store { .. }));
    }
}
