//! Incident query filter
//!
//! A small conjunctive query language: `field:value` terms joined by `AND`.
//! Values may be double-quoted to include spaces. Matching is case-insensitive.

use crate::enrich::status_label;
use crate::errors::{KinshipError, KinshipResult};
use crate::models::IncidentRecord;
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTerm {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncidentQuery {
    terms: Vec<QueryTerm>,
}

impl IncidentQuery {
    /// Terms are read left to right so a quoted value may contain `and`
    pub fn parse(raw: &str) -> KinshipResult<Self> {
        let term_pattern = r#"^([A-Za-z_][\w.]*):(?:"([^"]*)"|([^\s"]\S*))"#;
        let term_re = Regex::new(term_pattern).map_err(|e| KinshipError::regex(e, term_pattern))?;
        let joiner_pattern = r"^(?i)\s+and\s+";
        let joiner_re =
            Regex::new(joiner_pattern).map_err(|e| KinshipError::regex(e, joiner_pattern))?;

        let mut terms = Vec::new();
        let mut rest = raw.trim();
        if rest.is_empty() {
            return Err(KinshipError::query(raw, "empty query"));
        }

        loop {
            let caps = term_re.captures(rest).ok_or_else(|| {
                KinshipError::query(raw, format!("expected field:value, got '{}'", rest))
            })?;
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            terms.push(QueryTerm {
                field: caps[1].to_lowercase(),
                value,
            });

            rest = &rest[caps.get(0).map_or(rest.len(), |m| m.end())..];
            if rest.is_empty() {
                break;
            }
            let joiner = joiner_re.find(rest).ok_or_else(|| {
                KinshipError::query(raw, format!("expected AND before '{}'", rest.trim()))
            })?;
            rest = &rest[joiner.end()..];
        }

        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[QueryTerm] {
        &self.terms
    }

    /// True when every term matches the incident
    pub fn matches(&self, incident: &IncidentRecord) -> bool {
        self.terms.iter().all(|term| term_matches(term, incident))
    }
}

fn term_matches(term: &QueryTerm, incident: &IncidentRecord) -> bool {
    let wanted = term.value.to_lowercase();
    match term.field.as_str() {
        "id" | "incident.id" => incident.id.to_lowercase() == wanted,
        "name" => incident.name.to_lowercase() == wanted,
        "status" => {
            incident.status.to_string() == wanted
                || status_label(incident.status).to_lowercase() == wanted
        }
        field => incident
            .fields
            .iter()
            .find(|(k, _)| k.to_lowercase() == field)
            .map(|(_, v)| json_matches(v, &wanted))
            .unwrap_or(false),
    }
}

fn json_matches(value: &serde_json::Value, wanted: &str) -> bool {
    match value {
        serde_json::Value::String(s) => s.to_lowercase() == wanted,
        serde_json::Value::Array(items) => items.iter().any(|item| json_matches(item, wanted)),
        serde_json::Value::Null => false,
        other => other.to_string().to_lowercase() == wanted,
    }
}
