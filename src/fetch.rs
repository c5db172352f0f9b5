//! Data collection for a similarity run.
//!
//! Wraps the raw [`IncidentStore`] calls with the filtering rules the engine
//! relies on: the association whitelist, the type filter, the minimum
//! indicator count and the sandbox incident exclusion.

use crate::config::SimilarityConfig;
use crate::errors::{KinshipError, KinshipResult};
use crate::models::Indicator;
use crate::store::{IncidentQuery, IncidentStore};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;

/// Hard cap on mutual indicators pulled for scoring
pub const MUTUAL_INDICATOR_LIMIT: usize = 150;

/// Ids of ephemeral playground/sandbox incidents
pub const PLAYGROUND_PATTERN: &str =
    "^[a-z0-9]{8}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{12}";

/// Qualifying indicators of the target incident, in store order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetIndicators {
    indicators: Vec<Indicator>,
}

impl TargetIndicators {
    pub fn new(indicators: Vec<Indicator>) -> Self {
        Self { indicators }
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.indicators.iter().map(|i| i.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.indicators.iter()
    }
}

/// Fetch the indicators of the target incident that qualify for scoring.
///
/// Returns an empty set when fewer than `min_indicator_count` survive.
pub fn fetch_target_indicators<S: IncidentStore + ?Sized>(
    store: &S,
    incident_id: &str,
    config: &SimilarityConfig,
) -> KinshipResult<TargetIndicators> {
    let raw = store.find_indicators(incident_id)?;
    if raw.is_empty() {
        log::info!("Incident {} has no indicators", incident_id);
        return Ok(TargetIndicators::default());
    }

    let total = raw.len();
    let qualifying: Vec<Indicator> = raw
        .into_iter()
        .filter(|ind| ind.incident_ids.len() <= config.max_association_whitelist)
        .filter(|ind| config.allows_type(&ind.indicator_type))
        .collect();

    if qualifying.len() < config.min_indicator_count {
        log::info!(
            "Incident {} has {} qualifying indicators out of {}, below the minimum of {}",
            incident_id,
            qualifying.len(),
            total,
            config.min_indicator_count
        );
        return Ok(TargetIndicators::default());
    }

    let target = TargetIndicators::new(qualifying);
    log::debug!(
        "Found {} indicators for incident {}: {:?}",
        target.len(),
        incident_id,
        target.ids()
    );
    Ok(target)
}

/// Collect the incidents linked to the target's indicators, in discovery order.
///
/// Playground incidents are dropped. A query or from-date narrows the list
/// through the store.
pub fn fetch_related_incident_ids<S: IncidentStore + ?Sized>(
    store: &S,
    target: &TargetIndicators,
    query: Option<&IncidentQuery>,
    from_date: Option<DateTime<Utc>>,
) -> KinshipResult<Vec<String>> {
    let playground =
        Regex::new(PLAYGROUND_PATTERN).map_err(|e| KinshipError::regex(e, PLAYGROUND_PATTERN))?;

    let mut seen = HashSet::new();
    let incident_ids: Vec<String> = target
        .iter()
        .flat_map(|ind| ind.incident_ids.iter())
        .filter(|id| !playground.is_match(id))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    if incident_ids.is_empty() || (query.is_none() && from_date.is_none()) {
        log::debug!("Found {} related incidents: {:?}", incident_ids.len(), incident_ids);
        return Ok(incident_ids);
    }

    let incident_ids = store.search_incident_ids(&incident_ids, query, from_date)?;
    log::debug!("Found {} related incidents: {:?}", incident_ids.len(), incident_ids);
    Ok(incident_ids)
}

/// Fetch the target indicators shared with the candidate incidents
pub fn fetch_mutual_indicators<S: IncidentStore + ?Sized>(
    store: &S,
    candidate_ids: &[String],
    target: &TargetIndicators,
    limit: usize,
) -> KinshipResult<Vec<Indicator>> {
    if candidate_ids.is_empty() || target.is_empty() {
        log::debug!("No mutual indicators were found.");
        return Ok(Vec::new());
    }

    let mutual = store.find_mutual_indicators(&target.ids(), candidate_ids, limit)?;
    log::debug!(
        "Found {} mutual indicators: {:?}",
        mutual.len(),
        mutual.iter().map(|i| i.id.as_str()).collect::<Vec<_>>()
    );
    Ok(mutual)
}
