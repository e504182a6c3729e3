//! Report assembly.
//!
//! [`ReportEngine`] runs the whole pipeline for one package: extraction,
//! manifest parsing and per-partition reconciliation. Failures never escape
//! as `Err`; they are recorded on the returned [`Report`] next to whatever
//! partitions completed first.

mod engine;
mod types;

use serde::Serialize;
use thiserror::Error;

use crate::manifest::ManifestError;
use crate::package::PackageError;
use crate::reconcile::ReconcileError;

pub use engine::ReportEngine;
pub use types::*;

/// Category of the failure that ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
  PackageNotFound,
  ArchiveEntryMissing,
  ExtractionFailed,
  ManifestMalformed,
  ItemDefinitionUnreadable,
  StoreUnavailable,
}

#[derive(Debug, Error)]
pub enum ReportError {
  #[error(transparent)]
  Package(#[from] PackageError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error("partition '{partition}': {source}")]
  Reconcile {
    partition: String,
    #[source]
    source: ReconcileError,
  },
}

impl ReportError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ReportError::Package(PackageError::NotFound(_)) => ErrorKind::PackageNotFound,
      ReportError::Package(PackageError::MissingEntry { .. } | PackageError::MissingPartition(_)) => {
        ErrorKind::ArchiveEntryMissing
      }
      ReportError::Package(_) => ErrorKind::ExtractionFailed,
      ReportError::Manifest(_) => ErrorKind::ManifestMalformed,
      ReportError::Reconcile {
        source: ReconcileError::Collision(_),
        ..
      } => ErrorKind::ItemDefinitionUnreadable,
      ReportError::Reconcile {
        source: ReconcileError::Store(_),
        ..
      } => ErrorKind::StoreUnavailable,
    }
  }
}
