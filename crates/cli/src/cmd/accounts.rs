//! Implementation of the `shipreport accounts` command.
//!
//! A dry run: every security entry is parsed and listed, nothing is installed.

use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use shipreport_lib::ReportConfig;
use shipreport_lib::security::{AccountEntry, AccountError, AccountInstaller, InstallOutcome, install_package_accounts};

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_warning, symbols};

/// Built-in administrator, never replaced by a package.
const ADMIN_ACCOUNT: &str = "sitecore\\admin";

/// Accepts every account once, without touching any host.
#[derive(Default)]
struct DryRunInstaller {
  seen: HashSet<String>,
}

impl AccountInstaller for DryRunInstaller {
  fn install(&mut self, entry: &AccountEntry, _payload: &[u8]) -> Result<InstallOutcome, AccountError> {
    let account = entry.account_name();
    if account.eq_ignore_ascii_case(ADMIN_ACCOUNT) {
      return Ok(InstallOutcome::Skipped("the administrator account is never installed".to_string()));
    }
    if !self.seen.insert(account.to_lowercase()) {
      return Ok(InstallOutcome::Skipped("already listed".to_string()));
    }
    Ok(InstallOutcome::Installed)
  }
}

pub fn cmd_accounts(package: &Path, output: OutputFormat, config_path: Option<&Path>) -> Result<ExitCode> {
  let config = ReportConfig::load(config_path).context("Failed to load config")?;
  let mut installer = DryRunInstaller::default();

  let summary = install_package_accounts(package, &config, &mut installer)
    .with_context(|| format!("Failed to read security entries from {}", package.display()))?;

  if output.is_json() {
    print_json(&summary)?;
    return Ok(ExitCode::SUCCESS);
  }

  if summary.total() == 0 {
    print_info("No security accounts in package");
    return Ok(ExitCode::SUCCESS);
  }

  for account in &summary.installed {
    println!("  {} {}", symbols::INFO, account);
  }
  for note in &summary.skipped {
    print_info(&format!("{} skipped: {}", note.account, note.reason));
  }
  for note in &summary.failed {
    print_warning(&format!("{} failed: {}", note.account, note.reason));
  }
  for key in &summary.rejected {
    print_warning(&format!("Bad entry key '{}'", key));
  }

  println!();
  print_stat("Would install", &summary.installed.len().to_string());
  print_stat("Skipped", &summary.skipped.len().to_string());
  print_stat("Rejected", &summary.rejected.len().to_string());
  Ok(ExitCode::SUCCESS)
}
