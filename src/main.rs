// ELVR Pipeline - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/elvr-pipeline results.elvr
// ```
//
// Or with a configuration file and a summary report:
//
// ```console
// $ ./target/release/elvr-pipeline a.elvr b.elvr --config pipeline.json --output report.json --verbose
// ```

use anyhow::{bail, Context};
use clap::Parser;
use elvr_pipeline::parser::CatalogTotals;
use elvr_pipeline::pipeline::{
    LoggingConfig, SummaryCache, SummaryDocument, TracingProgress, UploadProcessor, UploadReport,
};
use elvr_pipeline::types::config::CliArgs;
use elvr_pipeline::types::PipelineConfig;
use std::fs;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match PipelineConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let logging = if args.debug {
        LoggingConfig::new().with_level(tracing::Level::DEBUG).with_span_events()
    } else if args.verbose {
        LoggingConfig::new().with_level(tracing::Level::INFO).with_span_events()
    } else {
        // Default: minimal logging for normal users
        LoggingConfig::new().with_level(tracing::Level::WARN)
    };
    let logging = if args.json_logs { logging.with_json_format() } else { logging };

    if let Err(e) = logging.init() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Starting ELVR Pipeline");

    let config = match PipelineConfig::from_cli_args(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - no file will be processed.");
        print_configuration_summary(&config);
        return;
    }

    if let Err(e) = run(config, &args.inputs, args.verbose || args.debug) {
        error!("Processing failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("ELVR Pipeline completed successfully");
}

/// Process every input and write the optional summary report
fn run(config: PipelineConfig, inputs: &[String], show_progress: bool) -> anyhow::Result<()> {
    if inputs.is_empty() {
        bail!("No input files given (see --help)");
    }

    let output_path = config.output_path.clone();
    let mut processor =
        UploadProcessor::new(config, SummaryCache::new()).context("Failed to create processor")?;
    if show_progress {
        processor = processor.with_progress(Box::new(TracingProgress));
    }

    eprintln!("Processing {} file(s)...", inputs.len());
    let reports = processor.process_files(inputs).context("Failed to process uploads")?;

    for report in &reports {
        print_upload_report(report);
    }

    eprintln!("Summary Catalog:");
    eprintln!("================");
    for summary in processor.summary_table() {
        eprintln!("  {} [{}]: {}", summary.name, summary.simulation_id, summary.kpis);
    }
    eprintln!();

    if let Some(path) = output_path {
        let documents: Vec<SummaryDocument> =
            reports.iter().map(|report| report.to_document(processor.config())).collect();
        let json = serde_json::to_string_pretty(&documents).context("Failed to serialize summary report")?;
        fs::write(&path, json).with_context(|| format!("Failed to write summary report to {}", path))?;
        eprintln!("Summary report written to: {}", path);
    }

    Ok(())
}

fn print_upload_report(report: &UploadReport) {
    let totals = CatalogTotals::from_entries(&report.catalog);

    eprintln!("Upload: {} ({})", report.name, report.upload_id);
    eprintln!("  {}", totals.statement());
    for entry in &report.catalog {
        eprintln!(
            "  {}: {} run(s), {} lift(s), categories [{}]",
            entry.simulation_id,
            entry.run_count,
            entry.lift_count,
            entry.categories.join(", ")
        );
    }

    for scenario in &report.scenarios {
        match &scenario.summary {
            Some(summary) => {
                eprintln!("  Scenario {} ({} usable run(s))", summary.simulation_id, scenario.runs.len());
                eprintln!("    {}", summary.kpis);
                for run in &scenario.runs {
                    eprintln!("    run {}: {}", run.summary.run_id.as_ref().map_or("?", |id| id.as_str()), run.summary.kpis);
                }
            }
            None => eprintln!("  Scenario {}: no usable runs", scenario.simulation_id),
        }
        for skipped in &scenario.skipped_runs {
            eprintln!("    skipped run {}: {}", skipped.run_id, skipped.reason);
        }
    }

    if !report.skipped_sections.is_empty() {
        eprintln!("  {} section(s) skipped", report.skipped_sections.len());
    }
    eprintln!();
}

fn print_configuration_summary(config: &PipelineConfig) {
    eprintln!("Configuration:");
    eprintln!("  Header Marker: {}", config.header_marker);
    eprintln!("  Skipped Categories: {}", config.skip_categories.join(", "));
    eprintln!("  Summary Decimals: {}", config.summary_decimals);
    eprintln!("  Chart Sample Stride: {}s", config.chart_sample_stride);
    eprintln!("  Wait Thresholds: {:?}", config.wait_thresholds);
    if let Some(name) = &config.scenario_name {
        eprintln!("  Scenario Name: {}", name);
    }
    if let Some(path) = &config.output_path {
        eprintln!("  Output Path: {}", path);
    }
    eprintln!();
}
