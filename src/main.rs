use clap::Parser;
use console::style;
use env_logger::Env;
use kinship::cli::{Args, OutputFormat};
use kinship::reporter::{self, MarkdownReporter};
use kinship::{SimilarityConfig, SimilarityEngine, SnapshotStore};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Initialize logging based on verbosity and quiet flags
    let log_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    log::info!("Kinship starting with args: {:?}", args);

    // Configuration is checked before the store is touched
    let config = SimilarityConfig::from_args(&args)?;
    let store = SnapshotStore::open(&args.store)?;

    let report = SimilarityEngine::new(&store, config).run(&args.incident_id)?;

    match args.format {
        OutputFormat::Markdown => println!("{}", MarkdownReporter::new().render(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.output {
        reporter::export_json(&report, path)?;
    }

    if !args.quiet {
        let found = report.similar_incidents.len();
        let marker = if found > 0 {
            style("✓").green()
        } else {
            style("-").dim()
        };
        eprintln!(
            "    {} {} similar incidents for {} {}",
            style("▶").blue(),
            style(found).bold(),
            style(&report.incident_id).bold(),
            marker
        );
        eprintln!(
            "    {} Mutual indicators: {}",
            style("└─").dim(),
            style(report.mutual_indicators.len()).bold()
        );
    }

    Ok(())
}
