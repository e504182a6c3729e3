//! Archive access behind a narrow trait.
//!
//! The extractor only needs to list entries, tell directories apart, and copy
//! single entries out, so that is all [`ArchiveSource`] offers.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use super::PackageError;

pub trait ArchiveSource {
  /// Names of every entry, in archive order.
  fn entry_names(&self) -> Vec<String>;

  fn is_dir(&mut self, name: &str) -> Result<bool, PackageError>;

  /// Stream a single entry to `dest`, creating parent directories.
  fn extract_entry(&mut self, name: &str, dest: &Path) -> Result<(), PackageError>;

  /// Read a single entry into memory.
  fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, PackageError>;
}

/// A zip archive on disk or in memory.
pub struct ZipSource<R> {
  archive: ZipArchive<R>,
  location: PathBuf,
}

impl ZipSource<BufReader<File>> {
  pub fn open(path: &Path) -> Result<Self, PackageError> {
    let file = File::open(path).map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        PackageError::NotFound(path.to_path_buf())
      } else {
        PackageError::Archive {
          path: path.to_path_buf(),
          source: ZipError::Io(e),
        }
      }
    })?;
    Self::new(BufReader::new(file), path)
  }
}

impl<R: Read + Seek> ZipSource<R> {
  pub fn new(reader: R, location: &Path) -> Result<Self, PackageError> {
    let archive = ZipArchive::new(reader).map_err(|source| PackageError::Archive {
      path: location.to_path_buf(),
      source,
    })?;
    Ok(Self {
      archive,
      location: location.to_path_buf(),
    })
  }
}

fn entry_error(location: &Path, name: &str, source: ZipError) -> PackageError {
  match source {
    ZipError::FileNotFound => PackageError::MissingEntry {
      archive: location.to_path_buf(),
      entry: name.to_string(),
    },
    source => PackageError::Archive {
      path: location.to_path_buf(),
      source,
    },
  }
}

impl<R: Read + Seek> ArchiveSource for ZipSource<R> {
  fn entry_names(&self) -> Vec<String> {
    self.archive.file_names().map(str::to_string).collect()
  }

  fn is_dir(&mut self, name: &str) -> Result<bool, PackageError> {
    let location = &self.location;
    let file = self
      .archive
      .by_name(name)
      .map_err(|e| entry_error(location, name, e))?;
    Ok(file.is_dir())
  }

  fn extract_entry(&mut self, name: &str, dest: &Path) -> Result<(), PackageError> {
    let extract_err = |source: io::Error| PackageError::Extract {
      entry: name.to_string(),
      dest: dest.to_path_buf(),
      source,
    };

    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).map_err(extract_err)?;
    }

    let location = &self.location;
    let mut file = self
      .archive
      .by_name(name)
      .map_err(|e| entry_error(location, name, e))?;
    let mut outfile = File::create(dest).map_err(extract_err)?;
    io::copy(&mut file, &mut outfile).map_err(extract_err)?;
    Ok(())
  }

  fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, PackageError> {
    let location = &self.location;
    let mut file = self
      .archive
      .by_name(name)
      .map_err(|e| entry_error(location, name, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| PackageError::Archive {
      path: location.to_path_buf(),
      source: ZipError::Io(source),
    })?;
    Ok(bytes)
  }
}
