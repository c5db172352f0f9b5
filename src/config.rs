//! Run configuration.
//!
//! [`SimilarityConfig`] is the single value object the engine reads. It is
//! validated up front so that no store access happens with a bad value.

use crate::cli::Args;
use crate::errors::{KinshipError, KinshipResult};
use crate::store::query::IncidentQuery;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use std::collections::BTreeSet;

pub const DEFAULT_THRESHOLD: f64 = 0.2;
pub const DEFAULT_MAX_RESULTS: usize = 20;
pub const DEFAULT_MIN_INDICATORS: usize = 2;
pub const DEFAULT_MAX_ASSOCIATION_WHITELIST: usize = 1000;

/// Fields that are always shown for each incident
pub const ALWAYS_DISPLAYED_FIELDS: [&str; 2] = ["created", "name"];

#[derive(Debug, Clone)]
pub struct SimilarityConfig {
    /// Candidates must score strictly above this
    pub threshold: f64,
    pub max_results: usize,
    pub min_indicator_count: usize,
    /// Indicators linked to more incidents than this are treated as noise
    pub max_association_whitelist: usize,
    /// Lowercased; empty means every type qualifies
    pub allowed_indicator_types: BTreeSet<String>,
    pub query: Option<IncidentQuery>,
    pub from_date: Option<DateTime<Utc>>,
    pub fields_to_display: BTreeSet<String>,
    pub show_actual_incident: bool,
    /// Scoring threads, 0 picks the CPU count
    pub threads: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
            min_indicator_count: DEFAULT_MIN_INDICATORS,
            max_association_whitelist: DEFAULT_MAX_ASSOCIATION_WHITELIST,
            allowed_indicator_types: BTreeSet::new(),
            query: None,
            from_date: None,
            fields_to_display: ALWAYS_DISPLAYED_FIELDS.iter().map(|f| f.to_string()).collect(),
            show_actual_incident: false,
            threads: 0,
        }
    }
}

impl SimilarityConfig {
    /// Validate raw command line values into a configuration
    pub fn from_args(args: &Args) -> KinshipResult<Self> {
        let threshold = parse_threshold(&args.threshold)?;
        let max_results = parse_count("max_results", &args.max_results)?;
        let min_indicator_count = parse_count("min_indicators", &args.min_indicators)?;
        let max_association_whitelist =
            parse_count("max_incidents_per_indicator", &args.max_incidents_per_indicator)?;

        let query = match args.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Some(IncidentQuery::parse(q)?),
            _ => None,
        };

        let from_date = match args.from_date.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => Some(parse_from_date(d, Utc::now())?),
            _ => None,
        };

        let config = Self {
            threshold,
            max_results,
            min_indicator_count,
            max_association_whitelist,
            allowed_indicator_types: normalize_types(&args.indicator_types),
            query,
            from_date,
            fields_to_display: display_fields(&args.fields),
            show_actual_incident: args.show_actual_incident,
            threads: args.threads,
        };

        log::debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// Whether an indicator type passes the type filter
    pub fn allows_type(&self, indicator_type: &str) -> bool {
        self.allowed_indicator_types.is_empty()
            || self
                .allowed_indicator_types
                .contains(&indicator_type.to_lowercase())
    }
}

fn parse_threshold(raw: &str) -> KinshipResult<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| KinshipError::config("threshold", format!("not a number: '{}'", raw)))?;
    if !value.is_finite() {
        return Err(KinshipError::config(
            "threshold",
            format!("must be finite, got '{}'", raw),
        ));
    }
    Ok(value)
}

fn parse_count(field: &str, raw: &str) -> KinshipResult<usize> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| KinshipError::config(field, format!("not an integer: '{}'", raw)))?;
    usize::try_from(value)
        .map_err(|_| KinshipError::config(field, format!("must not be negative, got {}", value)))
}

pub(crate) fn normalize_types(types: &[String]) -> BTreeSet<String> {
    types
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn display_fields(fields: &[String]) -> BTreeSet<String> {
    fields
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .chain(ALWAYS_DISPLAYED_FIELDS.iter().map(|f| f.to_string()))
        .collect()
}

/// Parse a from-date filter.
///
/// Accepts RFC 3339 timestamps, plain `YYYY-MM-DD` dates (midnight UTC) and
/// relative forms such as `7 days ago`.
pub fn parse_from_date(raw: &str, now: DateTime<Utc>) -> KinshipResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    let relative = Regex::new(r"(?i)^(\d+)\s+(minute|hour|day|week)s?\s+ago$")
        .map_err(|e| KinshipError::regex(e, "relative date"))?;
    if let Some(caps) = relative.captures(raw) {
        let amount: i64 = caps[1]
            .parse()
            .map_err(|_| KinshipError::config("from_date", format!("amount out of range: '{}'", raw)))?;
        let delta = match caps[2].to_lowercase().as_str() {
            "minute" => Duration::try_minutes(amount),
            "hour" => Duration::try_hours(amount),
            "day" => Duration::try_days(amount),
            _ => Duration::try_weeks(amount),
        };
        return delta
            .and_then(|d| now.checked_sub_signed(d))
            .ok_or_else(|| KinshipError::config("from_date", format!("out of range: '{}'", raw)));
    }

    Err(KinshipError::config(
        "from_date",
        format!("unrecognized date '{}'", raw),
    ))
}
