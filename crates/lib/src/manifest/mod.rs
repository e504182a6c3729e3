//! Deployment manifest parsing.
//!
//! The manifest lists every item a package adds or changes, per partition,
//! together with the flags that decide whether live descendants missing from
//! the package may be deleted.

mod parse;
mod types;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use parse::{load_manifest, parse_manifest};
pub use types::*;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("manifest file appears to be blank")]
  Blank,

  #[error("malformed manifest XML at byte {position}: {message}")]
  Xml { position: u64, message: String },

  #[error("manifest root is <{0}>, expected <DeployedItems>")]
  UnexpectedRoot(String),

  #[error("manifest entry #{ordinal} is missing required attribute '{attribute}'")]
  MissingAttribute { ordinal: usize, attribute: &'static str },
}
