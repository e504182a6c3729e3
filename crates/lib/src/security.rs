//! Security account entries carried by a package.
//!
//! Packages may ship user and role definitions under `security/`. Entry keys
//! look like `security/users/<domain>/<name>` or `security/roles/<name>`.
//! Installing them is the host's business; this module parses the keys and
//! drives an [`AccountInstaller`] over them.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ReportConfig;
use crate::package::{ArchiveSource, PackageError, PackageExtractor, require_package};

#[derive(Debug, Error)]
pub enum AccountError {
  #[error("bad entry key '{0}'")]
  BadKey(String),

  #[error("unexpected account type '{kind}' in '{key}'")]
  UnknownKind { key: String, kind: String },

  #[error("failed to install '{account}': {message}")]
  Install { account: String, message: String },

  #[error(transparent)]
  Package(#[from] PackageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
  User,
  Role,
}

impl fmt::Display for AccountKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AccountKind::User => f.write_str("user"),
      AccountKind::Role => f.write_str("role"),
    }
  }
}

/// A parsed security entry key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountEntry {
  pub key: String,
  pub kind: AccountKind,
  pub domain: Option<String>,
  pub name: String,
}

impl AccountEntry {
  /// Parse a key such as `security/users/sitecore/jdoe`.
  pub fn parse(key: &str, prefix: &str) -> Result<Self, AccountError> {
    let bad_key = || AccountError::BadKey(key.to_string());
    let rest = key.strip_prefix(prefix).ok_or_else(bad_key)?;

    let segments: Vec<&str> = rest.splitn(3, '/').collect();
    let (kind, domain, name) = match segments.as_slice() {
      [kind, name] => (*kind, None, *name),
      [kind, domain, name] => (*kind, Some(*domain), *name),
      _ => return Err(bad_key()),
    };
    if name.is_empty() {
      return Err(bad_key());
    }

    let kind = match kind {
      "users" => AccountKind::User,
      "roles" => AccountKind::Role,
      other => {
        return Err(AccountError::UnknownKind {
          key: key.to_string(),
          kind: other.to_string(),
        });
      }
    };

    Ok(Self {
      key: key.to_string(),
      kind,
      domain: domain.filter(|d| !d.is_empty()).map(str::to_string),
      name: name.to_string(),
    })
  }

  /// Qualified account name, `domain\name` when a domain is present.
  pub fn account_name(&self) -> String {
    match &self.domain {
      Some(domain) => format!("{}\\{}", domain, self.name),
      None => self.name.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
  Installed,
  /// Left alone on purpose, with the reason.
  Skipped(String),
}

/// Installs one account at a time into the host's security system.
pub trait AccountInstaller {
  fn install(&mut self, entry: &AccountEntry, payload: &[u8]) -> Result<InstallOutcome, AccountError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountNote {
  pub account: String,
  pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
  pub installed: Vec<String>,
  pub skipped: Vec<AccountNote>,
  pub failed: Vec<AccountNote>,
  /// Keys that could not be parsed.
  pub rejected: Vec<String>,
}

impl AccountSummary {
  pub fn total(&self) -> usize {
    self.installed.len() + self.skipped.len() + self.failed.len() + self.rejected.len()
  }
}

/// Drive `installer` over every security entry of `source`.
///
/// Per-entry problems are recorded in the summary and never stop the run.
/// Only failing to read the archive itself is an error.
pub fn install_accounts<A, I>(source: &mut A, prefix: &str, installer: &mut I) -> Result<AccountSummary, AccountError>
where
  A: ArchiveSource,
  I: AccountInstaller + ?Sized,
{
  let mut summary = AccountSummary::default();

  for key in source.entry_names() {
    if !key.starts_with(prefix) || source.is_dir(&key)? {
      continue;
    }

    let entry = match AccountEntry::parse(&key, prefix) {
      Ok(entry) => entry,
      Err(e) => {
        warn!(key = %key, error = %e, "rejecting security entry");
        summary.rejected.push(key);
        continue;
      }
    };

    let payload = source.read_entry(&key)?;
    let account = entry.account_name();
    match installer.install(&entry, &payload) {
      Ok(InstallOutcome::Installed) => {
        debug!(account = %account, kind = %entry.kind, "installed account");
        summary.installed.push(account);
      }
      Ok(InstallOutcome::Skipped(reason)) => {
        info!(account = %account, reason = %reason, "skipped account");
        summary.skipped.push(AccountNote { account, reason });
      }
      Err(e) => {
        warn!(account = %account, error = %e, "account install failed");
        summary.failed.push(AccountNote {
          account,
          reason: e.to_string(),
        });
      }
    }
  }

  info!(
    installed = summary.installed.len(),
    skipped = summary.skipped.len(),
    failed = summary.failed.len(),
    rejected = summary.rejected.len(),
    "processed security entries"
  );
  Ok(summary)
}

/// Open `package` (unwrapping update packages) and install its accounts.
pub fn install_package_accounts<I>(
  package: &Path,
  config: &ReportConfig,
  installer: &mut I,
) -> Result<AccountSummary, AccountError>
where
  I: AccountInstaller + ?Sized,
{
  require_package(package)?;
  let extractor = PackageExtractor::new(config);
  let workdir = extractor.create_workdir()?;
  let mut source = extractor.open_package(package, workdir.path())?;
  install_accounts(&mut source, &config.security_prefix, installer)
}
