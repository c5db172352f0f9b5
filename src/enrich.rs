//! Incident metadata enrichment for display.

use crate::engine::ScoredCandidate;
use crate::errors::KinshipResult;
use crate::fetch::TargetIndicators;
use crate::models::{ActualIncident, IncidentRecord, SimilarIncident};
use crate::store::IncidentStore;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn status_label(status: u8) -> &'static str {
    match status {
        0 => "Pending",
        1 => "Active",
        2 => "Closed",
        3 => "Archive",
        _ => " ",
    }
}

/// Render one display field of an incident
pub fn field_value(incident: &IncidentRecord, field: &str) -> String {
    match field {
        "created" => incident.created.format(DATE_FORMAT).to_string(),
        "status" => status_label(incident.status).to_string(),
        "name" => incident.name.clone(),
        "id" => incident.id.clone(),
        other => match incident.fields.get(other) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(value) => value.to_string(),
        },
    }
}

fn display_fields(
    incident: Option<&IncidentRecord>,
    fields: &BTreeSet<String>,
) -> BTreeMap<String, String> {
    fields
        .iter()
        .map(|f| {
            let value = incident.map(|inc| field_value(inc, f)).unwrap_or_default();
            (f.clone(), value)
        })
        .collect()
}

/// Indicator values for display; unknown ids render as a blank
pub fn indicator_values(ids: &[String], target: &TargetIndicators) -> Vec<String> {
    ids.iter()
        .map(|id| {
            target
                .get(id)
                .map(|ind| ind.value.clone())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| " ".to_string())
        })
        .collect()
}

fn lookup<S: IncidentStore + ?Sized>(
    store: &S,
    ids: Vec<String>,
) -> KinshipResult<HashMap<String, IncidentRecord>> {
    Ok(store
        .get_incidents(&ids)?
        .into_iter()
        .map(|inc| (inc.id.clone(), inc))
        .collect())
}

/// Attach indicator values and display fields to the ranked candidates
pub fn enrich_similar<S: IncidentStore + ?Sized>(
    store: &S,
    candidates: &[ScoredCandidate],
    target: &TargetIndicators,
    fields: &BTreeSet<String>,
) -> KinshipResult<Vec<SimilarIncident>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let incidents = lookup(store, candidates.iter().map(|c| c.incident_id.clone()).collect())?;
    if incidents.len() < candidates.len() {
        log::warn!(
            "Metadata found for {} of {} similar incidents",
            incidents.len(),
            candidates.len()
        );
    }

    Ok(candidates
        .iter()
        .map(|c| SimilarIncident {
            incident_id: c.incident_id.clone(),
            score: c.score,
            identical_indicators: c.identical_indicators.clone(),
            identical_indicator_values: indicator_values(&c.identical_indicators, target),
            fields: display_fields(incidents.get(&c.incident_id), fields),
        })
        .collect())
}

pub fn enrich_actual<S: IncidentStore + ?Sized>(
    store: &S,
    incident_id: &str,
    target: &TargetIndicators,
    fields: &BTreeSet<String>,
) -> KinshipResult<ActualIncident> {
    let incidents = lookup(store, vec![incident_id.to_string()])?;
    Ok(ActualIncident {
        incident_id: incident_id.to_string(),
        indicator_values: indicator_values(&target.ids(), target),
        fields: display_fields(incidents.get(incident_id), fields),
    })
}
