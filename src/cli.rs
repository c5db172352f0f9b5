use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kinship",
    about = "Kinship - find past incidents that share indicators of compromise with a target incident",
    version
)]

pub struct Args {
    /// Incident to find similar incidents for
    #[arg(short, long)]
    pub incident_id: String,

    /// JSON snapshot holding indicators and incidents
    #[arg(short, long)]
    pub store: PathBuf,

    /// Indicator types to consider (empty = all types)
    #[arg(long, value_delimiter = ',')]
    pub indicator_types: Vec<String>,

    /// Minimum number of qualifying indicators the incident must have
    #[arg(long, default_value = "2", allow_hyphen_values = true)]
    pub min_indicators: String,

    /// Ignore indicators associated with more incidents than this
    #[arg(long, default_value = "1000", allow_hyphen_values = true)]
    pub max_incidents_per_indicator: String,

    /// Query used to narrow the related incidents (e.g. `type:Phishing AND status:Active`)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Only consider incidents created on or after this date (RFC 3339, YYYY-MM-DD or "N days ago")
    #[arg(long)]
    pub from_date: Option<String>,

    /// Similarity threshold; only incidents scoring strictly above it are kept
    #[arg(short, long, default_value = "0.2", allow_hyphen_values = true)]
    pub threshold: String,

    /// Maximum number of similar incidents to display
    #[arg(short, long, default_value = "20", allow_hyphen_values = true)]
    pub max_results: String,

    /// Incident fields to display next to each result (created and name are always shown)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Also display the target incident
    #[arg(long)]
    pub show_actual_incident: bool,

    /// Output format written to stdout
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Write the full report as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of scoring threads (0 = auto-detect)
    #[arg(long, default_value = "0")]
    pub threads: usize,

    /// Enable verbose logging of all operations
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    /// Markdown tables for human reading
    Markdown,
    /// Pretty-printed JSON report
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::try_parse_from(["kinship", "-i", "42", "-s", "snap.json"]).unwrap();
        assert_eq!(args.incident_id, "42");
        assert_eq!(args.threshold, "0.2");
        assert_eq!(args.max_results, "20");
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.indicator_types.is_empty());
    }

    #[test]
    fn test_parse_lists_and_negative_counts() {
        let args = Args::try_parse_from([
            "kinship",
            "-i",
            "42",
            "-s",
            "snap.json",
            "--indicator-types",
            "IP,Domain",
            "--min-indicators",
            "-1",
            "--fields",
            "status,severity",
        ])
        .unwrap();
        assert_eq!(args.indicator_types, vec!["IP", "Domain"]);
        assert_eq!(args.min_indicators, "-1");
        assert_eq!(args.fields, vec!["status", "severity"]);
    }
}
