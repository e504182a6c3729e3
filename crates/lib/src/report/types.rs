use std::fmt;

use serde::Serialize;

use super::{ErrorKind, ReportError};

/// What the install step will do to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChangeType {
  #[serde(rename = "ADD")]
  Add,
  #[serde(rename = "UPD")]
  Update,
  #[serde(rename = "IGNORE")]
  Ignore,
  #[serde(rename = "DEL")]
  Delete,
}

impl ChangeType {
  pub fn code(self) -> &'static str {
    match self {
      ChangeType::Add => "ADD",
      ChangeType::Update => "UPD",
      ChangeType::Ignore => "IGNORE",
      ChangeType::Delete => "DEL",
    }
  }
}

impl fmt::Display for ChangeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// One row of a partition report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
  pub full_path: String,
  /// Normalized identifier.
  pub id: String,
  pub change_type: ChangeType,
}

impl ReportEntry {
  pub fn new(full_path: String, id: String, change_type: ChangeType) -> Self {
    Self {
      full_path,
      id,
      change_type,
    }
  }
}

impl fmt::Display for ReportEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {} {}", self.change_type, self.full_path, self.id)
  }
}

/// Counts per change type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
  pub added: usize,
  pub updated: usize,
  pub ignored: usize,
  pub deleted: usize,
}

impl ChangeSummary {
  pub fn from_entries(entries: &[ReportEntry]) -> Self {
    let mut summary = Self::default();
    for entry in entries {
      match entry.change_type {
        ChangeType::Add => summary.added += 1,
        ChangeType::Update => summary.updated += 1,
        ChangeType::Ignore => summary.ignored += 1,
        ChangeType::Delete => summary.deleted += 1,
      }
    }
    summary
  }

  pub fn total(&self) -> usize {
    self.added + self.updated + self.ignored + self.deleted
  }

  pub fn is_empty(&self) -> bool {
    self.total() == 0
  }
}

/// Options that shape the emitted report but not the analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
  /// Emit only per-partition summaries, with empty entry lists.
  pub summary_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionReport {
  pub name: String,
  /// Sorted by path, then identifier, then change type.
  pub entries: Vec<ReportEntry>,
  pub summary: ChangeSummary,
}

impl PartitionReport {
  pub fn new(name: &str, entries: Vec<ReportEntry>, options: ReportOptions) -> Self {
    let summary = ChangeSummary::from_entries(&entries);
    let entries = if options.summary_only { Vec::new() } else { entries };
    Self {
      name: name.to_string(),
      entries,
      summary,
    }
  }

  pub fn empty(name: &str) -> Self {
    Self::new(name, Vec::new(), ReportOptions::default())
  }
}

/// The outcome of one run.
///
/// When `error` is set the run stopped early; `partitions` then holds only
/// the partitions completed before the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub error: Option<String>,
  #[serde(skip)]
  error_kind: Option<ErrorKind>,
  pub can_delete_items: bool,
  pub partitions: Vec<PartitionReport>,
}

impl Report {
  pub fn error_kind(&self) -> Option<ErrorKind> {
    self.error_kind
  }

  pub fn is_ok(&self) -> bool {
    self.error.is_none()
  }

  pub fn partition(&self, name: &str) -> Option<&PartitionReport> {
    self.partitions.iter().find(|p| p.name == name)
  }

  /// Totals across every included partition.
  pub fn summary(&self) -> ChangeSummary {
    self.partitions.iter().fold(ChangeSummary::default(), |acc, p| ChangeSummary {
      added: acc.added + p.summary.added,
      updated: acc.updated + p.summary.updated,
      ignored: acc.ignored + p.summary.ignored,
      deleted: acc.deleted + p.summary.deleted,
    })
  }

  pub(crate) fn record_error(&mut self, err: &ReportError) {
    self.error = Some(err.to_string());
    self.error_kind = Some(err.kind());
  }
}
