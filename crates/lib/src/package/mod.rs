//! Deployment package access.
//!
//! A package is a zip archive, optionally wrapped in an outer "update" archive
//! that carries the real package as a single inner entry. Only the manifest
//! and the per-partition item definitions are ever unpacked.
//!
//! # Extraction Layout
//!
//! ```text
//! <temp root>/shipreport-XXXX/
//! ├── package.zip          # unwrapped inner package (update wrappers only)
//! ├── DeployedItems.xml    # the manifest
//! └── items/<partition>/   # flattened item definitions, lower-cased names
//! ```

mod archive;
mod extract;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use archive::{ArchiveSource, ZipSource};
pub use extract::{ExtractedPackage, PackageExtractor};
pub(crate) use extract::require_package;

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("cannot find package file at {0}")]
  NotFound(PathBuf),

  #[error("cannot find file ({entry}) in package at {archive}")]
  MissingEntry { archive: PathBuf, entry: String },

  #[error("package has no item definitions for partition '{0}'")]
  MissingPartition(String),

  #[error("failed to read archive {path}: {source}")]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("failed to create extraction directory: {0}")]
  Workspace(#[source] io::Error),

  #[error("failed to extract {entry} to {dest}: {source}")]
  Extract {
    entry: String,
    dest: PathBuf,
    #[source]
    source: io::Error,
  },
}
