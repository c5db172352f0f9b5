//! JSON snapshot store

use super::{IncidentQuery, IncidentStore};
use crate::errors::{KinshipError, KinshipResult};
use crate::models::{Indicator, IncidentRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// On-disk layout of a snapshot export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub indicators: Vec<Indicator>,
    #[serde(default)]
    pub incidents: Vec<IncidentRecord>,
}

/// Read-only store over a snapshot held in memory
pub struct SnapshotStore {
    indicators: Vec<Indicator>,
    incidents: Vec<IncidentRecord>,
    incident_index: HashMap<String, usize>,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> KinshipResult<Self> {
        let mut incident_index = HashMap::with_capacity(snapshot.incidents.len());
        for (idx, incident) in snapshot.incidents.iter().enumerate() {
            if incident_index.insert(incident.id.clone(), idx).is_some() {
                return Err(KinshipError::store(
                    "load",
                    format!("duplicate incident id '{}'", incident.id),
                ));
            }
        }

        let mut seen = HashSet::new();
        for indicator in &snapshot.indicators {
            if !seen.insert(indicator.id.as_str()) {
                return Err(KinshipError::store(
                    "load",
                    format!("duplicate indicator id '{}'", indicator.id),
                ));
            }
        }

        Ok(Self {
            indicators: snapshot.indicators,
            incidents: snapshot.incidents,
            incident_index,
        })
    }

    pub fn open(path: &Path) -> KinshipResult<Self> {
        log::debug!("Loading snapshot from: {:?}", path);
        let raw = std::fs::read_to_string(path)
            .map_err(|e| KinshipError::io(e, Some(path.to_path_buf())))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        log::info!(
            "Loaded snapshot with {} indicators and {} incidents",
            snapshot.indicators.len(),
            snapshot.incidents.len()
        );
        Self::new(snapshot)
    }

    fn incident(&self, id: &str) -> Option<&IncidentRecord> {
        self.incident_index.get(id).and_then(|idx| self.incidents.get(*idx))
    }
}

impl IncidentStore for SnapshotStore {
    fn find_indicators(&self, incident_id: &str) -> KinshipResult<Vec<Indicator>> {
        Ok(self
            .indicators
            .iter()
            .filter(|ind| ind.involves(incident_id))
            .cloned()
            .collect())
    }

    fn search_incident_ids(
        &self,
        incident_ids: &[String],
        query: Option<&IncidentQuery>,
        from_date: Option<DateTime<Utc>>,
    ) -> KinshipResult<Vec<String>> {
        let ids = incident_ids
            .iter()
            .filter_map(|id| self.incident(id))
            .filter(|inc| from_date.map_or(true, |from| inc.created >= from))
            .filter(|inc| query.map_or(true, |q| q.matches(inc)))
            .map(|inc| inc.id.clone())
            .collect();
        Ok(ids)
    }

    fn find_mutual_indicators(
        &self,
        indicator_ids: &[String],
        incident_ids: &[String],
        limit: usize,
    ) -> KinshipResult<Vec<Indicator>> {
        let wanted: HashSet<&str> = indicator_ids.iter().map(String::as_str).collect();
        let incidents: HashSet<&str> = incident_ids.iter().map(String::as_str).collect();
        Ok(self
            .indicators
            .iter()
            .filter(|ind| wanted.contains(ind.id.as_str()))
            .filter(|ind| ind.incident_ids.iter().any(|id| incidents.contains(id.as_str())))
            .take(limit)
            .cloned()
            .collect())
    }

    fn get_incidents(&self, incident_ids: &[String]) -> KinshipResult<Vec<IncidentRecord>> {
        Ok(incident_ids
            .iter()
            .filter_map(|id| self.incident(id))
            .cloned()
            .collect())
    }
}
