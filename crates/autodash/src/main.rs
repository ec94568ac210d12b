//! CLI entry point for the automatic dashboard.

use anyhow::{Result, anyhow};
use autodash::config::DashboardConfigBuilder;
use autodash::loader::load_table;
use autodash::{
    Dashboard, DashboardConfig, DashboardReport, DashboardResult, DataCleaner, RawTable,
    ReportGenerator,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Automatic dashboard generation for tabular datasets",
    long_about = "Cleans a dataset, profiles it, plans a set of charts and writes a short \
                  narrative.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  autodash -i sales.csv\n\n  \
                  # Full report on stdout\n  \
                  autodash -i sales.csv --json | jq .summary\n\n  \
                  # Write the report and the cleaned dataset\n  \
                  autodash -i sales.xlsx -o results/ --emit-report --write-cleaned\n\n  \
                  # Upload summary only\n  \
                  autodash -i sales.csv --dry-run"
)]
struct Args {
    /// Path to the CSV, Excel (.xlsx, .xls) or Parquet file to analyze
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Custom output file name (without extension)
    ///
    /// If not specified, uses the input file name
    #[arg(long)]
    output_name: Option<String>,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of bins per distribution histogram
    #[arg(long)]
    histogram_bins: Option<usize>,

    /// Maximum number of distribution charts
    #[arg(long)]
    max_distribution_charts: Option<usize>,

    /// Maximum number of categorical bar charts
    #[arg(long)]
    max_categorical_charts: Option<usize>,

    /// Number of values shown per categorical bar chart
    #[arg(long)]
    top_k: Option<usize>,

    /// Maximum number of scatter matrix dimensions
    #[arg(long)]
    max_scatter_dimensions: Option<usize>,

    /// Show the upload summary (shape, column kinds, missing values) and exit
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory as <name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Write the cleaned dataset to the output directory as <name>_cleaned.csv
    #[arg(short = 'w', long)]
    write_cleaned: bool,
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

    let config = build_config(&args)?;
    let raw = load_table(&args.input)?;

    if args.dry_run {
        return run_dry_run(&args, &raw, config);
    }

    let dashboard = build_dashboard(&args, config)?;

    info!("{}", "=".repeat(80));
    info!("Starting dashboard analysis...");
    info!("{}", "=".repeat(80));

    match dashboard.analyze(&raw) {
        Ok(result) => handle_output(&result, &raw, &args),
        Err(e) => {
            error!("Analysis failed: {}", e);
            Err(anyhow!("Analysis failed: {}", e))
        }
    }
}

/// Merge the config file (if any) with flag overrides.
fn build_config(args: &Args) -> Result<DashboardConfig> {
    let base = match &args.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    let mut builder = DashboardConfigBuilder::from_config(base);
    if let Some(bins) = args.histogram_bins {
        builder = builder.histogram_bins(bins);
    }
    if let Some(max) = args.max_distribution_charts {
        builder = builder.max_distribution_charts(max);
    }
    if let Some(max) = args.max_categorical_charts {
        builder = builder.max_categorical_charts(max);
    }
    if let Some(k) = args.top_k {
        builder = builder.categorical_top_k(k);
    }
    if let Some(max) = args.max_scatter_dimensions {
        builder = builder.max_scatter_dimensions(max);
    }

    Ok(builder.build()?)
}

fn build_dashboard(args: &Args, config: DashboardConfig) -> Result<Dashboard> {
    let mut builder = Dashboard::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Print the upload summary without profiling or planning.
///
/// Uses `println!` on purpose: this output is the point of `--dry-run` and
/// must show regardless of log level.
fn run_dry_run(args: &Args, raw: &RawTable, config: DashboardConfig) -> Result<()> {
    let cleaned = DataCleaner::new(config).clean(raw);
    let overview = cleaned.overview();
    let summary = cleaned.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Upload summary");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Raw: {} rows x {} columns", raw.height(), raw.width());
    println!(
        "  Cleaned: {} rows x {} columns",
        overview.rows, overview.columns
    );
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!("{:<24} {:<12} {:<10}", "Column", "Kind", "Missing");
    println!("{}", "-".repeat(48));
    for (name, kind) in &overview.column_types {
        let missing = summary.missing_before.get(name).copied().unwrap_or(0);
        println!(
            "{:<24} {:<12} {:<10}",
            truncate_str(name, 23),
            kind.as_str(),
            missing
        );
    }
    for name in &summary.empty_columns_removed {
        println!("{:<24} {:<12} {:<10}", truncate_str(name, 23), "(dropped)", raw.height());
    }
    println!();

    println!("CLEANING ACTIONS");
    println!("{}", "-".repeat(40));
    if summary.actions.is_empty() {
        println!("  Nothing to clean");
    } else {
        for action in &summary.actions {
            println!("  - {}", action);
        }
    }
    println!();

    println!("OUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    let stem = output_stem(args);
    if args.emit_report {
        println!("  - {}/{}_report.json", args.output, stem);
    }
    if args.write_cleaned {
        println!("  - {}/{}_cleaned.csv", args.output, stem);
    }
    if !args.emit_report && !args.write_cleaned {
        println!("  (none; add --emit-report or --write-cleaned)");
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To run the full analysis, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Handle analysis output based on CLI flags.
///
/// - Default: print a human-readable summary to stdout
/// - `--json`: print the JSON report to stdout only (no logs)
/// - `--emit-report` / `--write-cleaned`: write files to the output directory
fn handle_output(result: &DashboardResult, raw: &RawTable, args: &Args) -> Result<()> {
    let stem = extract_file_stem(&args.input);
    let generator = ReportGenerator::new(PathBuf::from(&args.output), args.output_name.clone());

    let cleaned_path = if args.write_cleaned {
        Some(generator.write_cleaned_dataset(&result.cleaned, &stem)?)
    } else {
        None
    };
    let cleaned_file = cleaned_path.as_ref().map(|p| p.display().to_string());

    let report = ReportGenerator::build_report(&args.input, cleaned_file.as_deref(), result);

    if args.emit_report {
        let report_path = generator.write_report_to_file(&report, &stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report, raw, args);

    Ok(())
}

/// File stem used for written files.
fn output_stem(args: &Args) -> String {
    args.output_name
        .clone()
        .unwrap_or_else(|| extract_file_stem(&args.input))
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to max length (in characters) with ellipsis.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print a human-readable summary of the analysis.
fn print_human_readable_summary(report: &DashboardReport, raw: &RawTable, args: &Args) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("DASHBOARD READY");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file,
        raw.height(),
        raw.width()
    );
    if let Some(ref cleaned_file) = report.cleaned_file {
        println!(
            "Output: {} ({} rows x {} columns)",
            cleaned_file, summary.rows_after, summary.columns_after
        );
    }
    println!();

    println!("Cleaning Summary:");
    println!("  Duration: {}ms", report.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {:.1}%)",
        summary.rows_before, summary.rows_after, summary.rows_removed, summary.rows_removed_percent
    );
    println!(
        "  Columns: {} -> {} ({} removed)",
        summary.columns_before, summary.columns_after, summary.columns_removed
    );
    println!("  Values imputed: {}", summary.values_imputed);
    if summary.columns_promoted > 0 {
        println!(
            "  Promoted to temporal: {}",
            report.cleaning.promoted_columns.join(", ")
        );
    }
    println!();

    if !report.cleaning.imputations.is_empty() {
        println!("Imputations:");
        for record in report.cleaning.imputations.iter().take(10) {
            match &record.fill_value {
                Some(value) => println!(
                    "  - {}: {} missing filled with {} '{}'",
                    record.column, record.values_filled, record.strategy, value
                ),
                None => println!(
                    "  - {}: {} missing filled ({})",
                    record.column, record.values_filled, record.strategy
                ),
            }
        }
        if report.cleaning.imputations.len() > 10 {
            println!(
                "  ... and {} more columns",
                report.cleaning.imputations.len() - 10
            );
        }
        println!();
    }

    println!("Charts ({}):", report.charts.len());
    for chart in &report.charts {
        println!("  - [{}] {}", chart.kind, chart.title);
    }
    println!();

    println!("Insights ({}):", report.insight_source);
    for line in report.insights.lines() {
        println!("  {}", line);
    }
    println!();

    if !args.emit_report {
        println!("Use --emit-report to save the full JSON report (profile and plot data)");
    }
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
