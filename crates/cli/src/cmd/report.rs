//! Implementation of the `shipreport report` command.
//!
//! Loads a live store snapshot, runs the report engine against a package, and
//! prints the result. Exits with status 1 when the report carries an error.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::debug;

use shipreport_lib::{JsonStore, PartitionReport, Report, ReportConfig, ReportEngine, ReportOptions};

use crate::output::{OutputFormat, change_marker, print_error, print_header, print_json, print_stat, print_success};

pub struct ReportArgs {
  pub output: OutputFormat,
  pub summary: bool,
  pub parallel: bool,
  pub verbose: bool,
}

pub fn cmd_report(package: &Path, store_path: &Path, args: ReportArgs, config_path: Option<&Path>) -> Result<ExitCode> {
  let mut config = ReportConfig::load(config_path).context("Failed to load config")?;
  if args.parallel {
    config.parallel = true;
  }

  let store = JsonStore::from_file(store_path)
    .with_context(|| format!("Failed to load store snapshot: {}", store_path.display()))?;

  // Missing packages are reported by the engine, so fall back to the path as given.
  let package = dunce::canonicalize(package).unwrap_or_else(|_| package.to_path_buf());
  debug!(package = %package.display(), parallel = config.parallel, "running report");

  let options = ReportOptions {
    summary_only: args.summary,
  };
  let report = ReportEngine::new(&store, &config).report_package(&package, options);

  if args.output.is_json() {
    print_json(&report)?;
  } else {
    print_text(&report, args.verbose);
  }

  if report.is_ok() {
    Ok(ExitCode::SUCCESS)
  } else {
    Ok(ExitCode::FAILURE)
  }
}

fn print_text(report: &Report, verbose: bool) {
  let allowed = if report.can_delete_items { "yes" } else { "no" };
  print_stat("Deletions allowed", allowed);
  println!();

  for partition in &report.partitions {
    print_partition(partition, verbose);
  }

  match (&report.error, report.error_kind()) {
    (Some(error), Some(kind)) => print_error(&format!("{:?}: {}", kind, error)),
    (Some(error), None) => print_error(error),
    (None, _) => {
      let total = report.summary();
      print_success(&format!(
        "{} added, {} updated, {} ignored, {} deleted",
        total.added, total.updated, total.ignored, total.deleted
      ));
    }
  }
}

fn print_partition(partition: &PartitionReport, verbose: bool) {
  print_header(&partition.name);
  for entry in &partition.entries {
    println!("{} {} {}", change_marker(entry.change_type), entry.full_path, entry.id);
  }
  if partition.summary.is_empty() {
    if verbose {
      println!("  (no changes)");
    }
  } else {
    let summary = &partition.summary;
    print_stat(
      "Summary",
      &format!(
        "{} added, {} updated, {} ignored, {} deleted",
        summary.added, summary.updated, summary.ignored, summary.deleted
      ),
    );
  }
  println!();
}
