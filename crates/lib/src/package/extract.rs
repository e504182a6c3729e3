use std::collections::BTreeSet;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::consts::WORKDIR_PREFIX;
use crate::ident::{flatten_entry_name, is_update_package};

use super::{ArchiveSource, PackageError, ZipSource};

/// File name of the extracted manifest inside the work directory.
const MANIFEST_FILENAME: &str = "DeployedItems.xml";

/// Directory holding the flattened per-partition item definitions.
const ITEMS_DIR: &str = "items";

/// The unpacked parts of a package.
///
/// Owns the run's temporary work directory; dropping the value removes it,
/// whichever way the run ends.
#[derive(Debug)]
pub struct ExtractedPackage {
  workdir: TempDir,
  manifest_path: PathBuf,
  partitions: BTreeSet<String>,
}

impl ExtractedPackage {
  pub fn manifest_path(&self) -> &Path {
    &self.manifest_path
  }

  /// Partitions that had at least one item definition in the package.
  pub fn partitions(&self) -> impl Iterator<Item = &str> {
    self.partitions.iter().map(String::as_str)
  }

  pub fn has_partition(&self, partition: &str) -> bool {
    self.partitions.contains(partition)
  }

  /// Directory of flattened item definitions for a partition.
  pub fn items_dir(&self, partition: &str) -> PathBuf {
    self.workdir.path().join(ITEMS_DIR).join(partition)
  }

  /// Like [`items_dir`](Self::items_dir), but fails if the package carried no
  /// item definitions for the partition.
  pub fn require_partition(&self, partition: &str) -> Result<PathBuf, PackageError> {
    if !self.has_partition(partition) {
      return Err(PackageError::MissingPartition(partition.to_string()));
    }
    Ok(self.items_dir(partition))
  }
}

pub struct PackageExtractor<'a> {
  config: &'a ReportConfig,
}

impl<'a> PackageExtractor<'a> {
  pub fn new(config: &'a ReportConfig) -> Self {
    Self { config }
  }

  /// Create this run's work directory under the configured temp root.
  pub fn create_workdir(&self) -> Result<TempDir, PackageError> {
    let root = self.config.temp_root();
    fs::create_dir_all(&root).map_err(PackageError::Workspace)?;
    tempfile::Builder::new()
      .prefix(WORKDIR_PREFIX)
      .tempdir_in(&root)
      .map_err(PackageError::Workspace)
  }

  /// Open the package that actually holds the manifest.
  ///
  /// Update wrappers are unwrapped into `workdir` first; simple packages are
  /// opened in place.
  pub fn open_package(&self, package: &Path, workdir: &Path) -> Result<ZipSource<BufReader<File>>, PackageError> {
    require_package(package)?;
    let mut outer = ZipSource::open(package)?;
    if !is_update_package(package, &self.config.update_suffix) {
      return Ok(outer);
    }

    let inner_name =
      flatten_entry_name(&self.config.inner_package_entry).unwrap_or_else(|| "package.zip".to_string());
    let inner_path = workdir.join(inner_name);
    outer.extract_entry(&self.config.inner_package_entry, &inner_path)?;
    debug!(path = ?inner_path, "unwrapped update package");

    ZipSource::open(&inner_path)
  }

  /// Extract the manifest and every partition's item definitions.
  pub fn extract(&self, package: &Path) -> Result<ExtractedPackage, PackageError> {
    require_package(package)?;
    let workdir = self.create_workdir()?;
    let mut source = self.open_package(package, workdir.path())?;

    let manifest_path = workdir.path().join(MANIFEST_FILENAME);
    source.extract_entry(&self.config.manifest_entry, &manifest_path)?;

    let items_root = workdir.path().join(ITEMS_DIR);
    let (partitions, item_count) = self.extract_items(&mut source, &items_root)?;

    info!(
      package = %package.display(),
      items = item_count,
      partitions = partitions.len(),
      "extracted package"
    );

    Ok(ExtractedPackage {
      workdir,
      manifest_path,
      partitions,
    })
  }

  /// Copy every item definition under the item prefix into
  /// `items_root/<partition>/<flattened name>`.
  fn extract_items<A: ArchiveSource>(
    &self,
    source: &mut A,
    items_root: &Path,
  ) -> Result<(BTreeSet<String>, usize), PackageError> {
    let mut partitions = BTreeSet::new();
    let mut count = 0;

    for name in source.entry_names() {
      let Some(rest) = name.strip_prefix(self.config.item_prefix.as_str()) else {
        continue;
      };
      let Some((partition, remainder)) = rest.split_once('/') else {
        continue;
      };
      if matches!(partition, "" | "." | "..") || source.is_dir(&name)? {
        continue;
      }
      let Some(file_name) = flatten_entry_name(remainder) else {
        continue;
      };

      let dest = items_root.join(partition).join(&file_name);
      if dest.exists() {
        debug!(entry = %name, file = %file_name, "item definition name repeats, keeping the later entry");
      }
      source.extract_entry(&name, &dest)?;
      partitions.insert(partition.to_string());
      count += 1;
    }

    Ok((partitions, count))
  }
}

/// A missing package is reported before any work directory is created.
pub(crate) fn require_package(package: &Path) -> Result<(), PackageError> {
  if package.exists() {
    Ok(())
  } else {
    Err(PackageError::NotFound(package.to_path_buf()))
  }
}
