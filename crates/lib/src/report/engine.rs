use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ReportConfig;
use crate::manifest::{DeployManifest, load_manifest};
use crate::package::{ExtractedPackage, PackageExtractor};
use crate::reconcile::PartitionReconciler;
use crate::store::ContentStore;

use super::{PartitionReport, Report, ReportError, ReportOptions};

/// Produces change reports for packages against one live store.
pub struct ReportEngine<'a, S: ContentStore + ?Sized> {
  store: &'a S,
  config: &'a ReportConfig,
}

impl<'a, S: ContentStore + ?Sized> ReportEngine<'a, S> {
  pub fn new(store: &'a S, config: &'a ReportConfig) -> Self {
    Self { store, config }
  }

  /// Report what installing `package` will do to the store.
  ///
  /// The work directory is removed before this returns, on every path.
  pub fn report_package(&self, package: &Path, options: ReportOptions) -> Report {
    info!(package = %package.display(), "report started");
    let mut report = Report::default();
    if let Err(err) = self.run(package, options, &mut report) {
      warn!(package = %package.display(), kind = ?err.kind(), error = %err, "report stopped early");
      report.record_error(&err);
    }

    let summary = report.summary();
    info!(
      package = %package.display(),
      partitions = report.partitions.len(),
      added = summary.added,
      updated = summary.updated,
      ignored = summary.ignored,
      deleted = summary.deleted,
      "report complete"
    );
    report
  }

  fn run(&self, package: &Path, options: ReportOptions, report: &mut Report) -> Result<(), ReportError> {
    let extracted = PackageExtractor::new(self.config).extract(package)?;
    let manifest = load_manifest(extracted.manifest_path(), self.config)?;

    // Every partition with declared entries must have shipped its items.
    for partition in &self.config.partitions {
      if !manifest.partition_entries(partition).is_empty() {
        extracted.require_partition(partition)?;
      }
    }
    for shipped in extracted.partitions() {
      if !self.config.is_partition(shipped) {
        warn!(partition = shipped, "package ships items for an unconfigured partition");
      }
    }
    report.can_delete_items = manifest.can_delete_items;
    info!(can_delete_items = manifest.can_delete_items, "delete policy");

    if self.config.parallel {
      let results: Vec<Result<PartitionReport, ReportError>> = self
        .config
        .partitions
        .par_iter()
        .map(|partition| self.report_partition(partition, &manifest, &extracted, options))
        .collect();
      for result in results {
        report.partitions.push(result?);
      }
    } else {
      for partition in &self.config.partitions {
        let partition_report = self.report_partition(partition, &manifest, &extracted, options)?;
        report.partitions.push(partition_report);
      }
    }
    Ok(())
  }

  fn report_partition(
    &self,
    partition: &str,
    manifest: &DeployManifest,
    extracted: &ExtractedPackage,
    options: ReportOptions,
  ) -> Result<PartitionReport, ReportError> {
    let entries = manifest.partition_entries(partition);
    if entries.is_empty() {
      info!(partition, "no declared entries");
      return Ok(PartitionReport::empty(partition));
    }

    info!(partition, declared = entries.len(), "----- {} -----", partition.to_uppercase());
    let items_dir = extracted.items_dir(partition);
    let rows = PartitionReconciler::new(self.store, partition, &items_dir, &self.config.item_suffix)
      .can_delete_items(manifest.can_delete_items)
      .reconcile(&entries)
      .map_err(|source| ReportError::Reconcile {
        partition: partition.to_string(),
        source,
      })?;

    for row in &rows {
      debug!(partition, "{}", row);
    }
    Ok(PartitionReport::new(partition, rows, options))
  }
}
