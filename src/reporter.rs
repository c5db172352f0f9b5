use crate::config::ALWAYS_DISPLAYED_FIELDS;
use crate::errors::{KinshipError, KinshipResult};
use crate::models::{ActualIncident, MutualIndicator, SimilarIncident, SimilarityReport};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

pub const INCIDENT_LINK_FORMAT: &str = "[{id}](#/Details/{id})";
pub const INDICATOR_LINK_FORMAT: &str = "[{id}](#/indicator/{id})";

pub fn incident_link(id: &str) -> String {
    INCIDENT_LINK_FORMAT.replace("{id}", id)
}

pub fn indicator_link(id: &str) -> String {
    INDICATOR_LINK_FORMAT.replace("{id}", id)
}

pub struct MarkdownReporter;

impl MarkdownReporter {
    pub fn new() -> Self {
        Self
    }

    /// Render every section of the report
    pub fn render(&self, report: &SimilarityReport) -> String {
        let mut out = String::new();
        if let Some(actual) = &report.actual_incident {
            out.push_str(&self.actual_incident_table(actual));
            out.push('\n');
        }
        out.push_str(&self.mutual_indicators_table(&report.mutual_indicators));
        out.push('\n');
        out.push_str(&self.similar_incidents_table(&report.similar_incidents));
        out
    }

    pub fn actual_incident_table(&self, actual: &ActualIncident) -> String {
        let extra = extra_fields(&actual.fields);
        let mut headers = leading_headers();
        headers.push("Indicators".to_string());
        headers.extend(extra.iter().map(|f| title_case(f)));

        let mut row = leading_cells(&actual.incident_id, &actual.fields);
        row.push(actual.indicator_values.join("\n"));
        row.extend(extra.iter().map(|f| actual.fields[*f].clone()));

        table("Actual Incident", &headers, &[row])
    }

    pub fn mutual_indicators_table(&self, rows: &[MutualIndicator]) -> String {
        let headers: Vec<String> = ["Indicator ID", "Value", "Type", "Reputation", "Involved Incidents Count"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    indicator_link(&r.id),
                    r.value.clone(),
                    r.indicator_type.clone(),
                    r.reputation.clone(),
                    r.involved_incidents_count.to_string(),
                ]
            })
            .collect();
        table("Mutual Indicators", &headers, &cells)
    }

    pub fn similar_incidents_table(&self, rows: &[SimilarIncident]) -> String {
        let extra = rows.first().map(|r| extra_fields(&r.fields)).unwrap_or_default();
        let mut headers = leading_headers();
        headers.push("Identical Indicators".to_string());
        headers.push("Similarity Indicators".to_string());
        headers.extend(extra.iter().map(|f| title_case(f)));

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                let mut row = leading_cells(&r.incident_id, &r.fields);
                row.push(r.identical_indicator_values.join("\n"));
                row.push(format!("{:.2}", r.score));
                row.extend(
                    extra
                        .iter()
                        .map(|f| r.fields.get(*f).cloned().unwrap_or_default()),
                );
                row
            })
            .collect();
        table("Similar incidents", &headers, &cells)
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the full report as pretty JSON
pub fn export_json(report: &SimilarityReport, path: &Path) -> KinshipResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|e| KinshipError::io(e, Some(path.to_path_buf())))?;
    log::info!("JSON report written to {:?}", path);
    Ok(())
}

fn leading_headers() -> Vec<String> {
    vec!["Incident ID".to_string(), "Created".to_string(), "Name".to_string()]
}

fn leading_cells(incident_id: &str, fields: &BTreeMap<String, String>) -> Vec<String> {
    vec![
        incident_link(incident_id),
        fields.get("created").cloned().unwrap_or_default(),
        fields.get("name").cloned().unwrap_or_default(),
    ]
}

fn extra_fields(fields: &BTreeMap<String, String>) -> Vec<&str> {
    fields
        .keys()
        .map(String::as_str)
        .filter(|f| !ALWAYS_DISPLAYED_FIELDS.contains(f) && *f != "id")
        .collect()
}

fn title_case(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', "<br>")
}

fn table(title: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = format!("### {}\n", title);
    if rows.is_empty() {
        out.push_str("**No entries.**\n");
        return out;
    }

    let _ = writeln!(out, "|{}|", headers.join("|"));
    let _ = writeln!(out, "|{}|", vec!["---"; headers.len()].join("|"));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        let _ = writeln!(out, "|{}|", cells.join("|"));
    }
    out
}
