//! CLI entry point for the SpectraMax plate parser.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use plate_processing::reporting::{ExportReport, PlateWriter};
use plate_processing::{
    OutputFormat, ParserConfig, PlateMeasurement, SpectraMaxParser, SpectraMaxXmlParser,
};
use std::path::Path;
use tracing::{error, info};

/// CLI-compatible output format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    /// Comma-separated values
    Csv,
    /// Apache Parquet
    Parquet,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli: CliOutputFormat) -> Self {
        match cli {
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Parquet => OutputFormat::Parquet,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "SpectraMax microplate reader XML parser",
    long_about = "Extracts per-plate measurement tables from SpectraMax XML exports.\n\n\
                  EXAMPLES:\n  \
                  # Write one CSV per plate to ./outputs\n  \
                  plate-processing -i export.xml\n\n  \
                  # Parquet tables in a custom directory\n  \
                  plate-processing -i export.xml -o tables/ --format parquet\n\n  \
                  # List plate names only\n  \
                  plate-processing -i export.xml --names\n\n  \
                  # Machine-readable summary\n  \
                  plate-processing -i export.xml --json | jq '.plates[].name'"
)]
struct Args {
    /// Path to the SpectraMax XML export
    #[arg(short, long)]
    input: String,

    /// Output directory for per-plate tables
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// File format for per-plate tables
    #[arg(long, value_enum, default_value = "csv")]
    format: CliOutputFormat,

    /// Print the export one row per line and exit
    #[arg(long)]
    prettify: bool,

    /// Print the plate names and exit
    #[arg(long)]
    names: bool,

    /// Skip plates with an unknown measurement type instead of failing
    #[arg(long)]
    skip_unknown: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of writing tables
    ///
    /// Disables all logs; only the plate summaries are printed.
    /// Useful for piping to other tools: `... --json | jq '.plates[0]'`
    #[arg(long)]
    json: bool,

    /// Write the JSON summary to the output directory as well
    ///
    /// The report will be saved as <input_name>_plates.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading export from: {}", args.input);
    let export = SpectraMaxXmlParser::from_path(&args.input)?;
    info!("Loaded {} rows", export.document().len());

    if args.prettify {
        println!("{}", export.prettify());
        return Ok(());
    }

    if args.names {
        for name in export.plate_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = ParserConfig::builder()
        .output_dir(&args.output)
        .output_format(args.format.into())
        .fail_on_unknown_measurement_type(!args.skip_unknown)
        .build()?;

    let parser = build_parser(&args, config)?;

    let plates = match export.parse_with(&parser) {
        Ok(plates) => plates,
        Err(e) => {
            error!("Parsing failed: {}", e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(anyhow!("Parsing failed: {}", e));
        }
    };

    handle_output(&plates, &parser, &args)
}

/// Build the parser, with progress logging unless quiet.
fn build_parser(args: &Args, config: ParserConfig) -> Result<SpectraMaxParser> {
    let mut builder = SpectraMaxParser::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| match &update.plate {
            Some(plate) => info!(
                "[{:.0}%] {} {}/{} '{}': {}",
                update.progress * 100.0,
                update.stage,
                plate.index,
                plate.total,
                plate.name,
                update.message
            ),
            None => info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage,
                update.message
            ),
        });
    }

    Ok(builder.build()?)
}

/// Handle parser output based on CLI flags.
///
/// Output behavior:
/// - Default: Write one table per plate and print a human-readable summary
/// - `--json`: Print the JSON report to stdout only (no tables, no logs)
/// - `--emit-report`: Also write the JSON report to the output directory
fn handle_output(plates: &[PlateMeasurement], parser: &SpectraMaxParser, args: &Args) -> Result<()> {
    if args.json {
        let report = ExportReport::new(&args.input, plates);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let writer = PlateWriter::from_config(parser.config());
    let paths = writer.write_tables(plates)?;
    let report = ExportReport::new(&args.input, plates).with_output_files(&paths);

    if args.emit_report {
        let stem = extract_file_stem(&args.input);
        let report_path = writer.write_report_to_file(&report, &stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report);
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export")
        .to_string()
}

/// Print a human-readable summary of the parsed plates.
fn print_human_readable_summary(report: &ExportReport) {
    println!();
    println!("{}", "=".repeat(80));
    println!("PARSING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!("Input: {} ({} plates)", report.input_file, report.plates.len());
    println!();

    println!(
        "{:<4} {:<24} {:<14} {:<8} {:>8}  {}",
        "#", "Plate", "Type", "Wells", "Records", "Read time"
    );
    println!("{}", "-".repeat(80));
    for (i, plate) in report.plates.iter().enumerate() {
        let read_time = plate
            .timestamp
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<4} {:<24} {:<14} {:<8} {:>8}  {}",
            i + 1,
            truncate_str(&plate.name, 23),
            plate.measurement_type.as_str(),
            plate.plate_type.well_count(),
            plate.records,
            read_time
        );
    }
    println!();

    if !report.output_files.is_empty() {
        println!("Output files:");
        for path in &report.output_files {
            println!("  - {}", path);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
