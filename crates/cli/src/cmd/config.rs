//! Implementation of the `shipreport config` command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use shipreport_lib::ReportConfig;

use crate::output::print_json;

pub fn cmd_config(config_path: Option<&Path>) -> Result<ExitCode> {
  let config = ReportConfig::load(config_path).context("Failed to load config")?;
  print_json(&config)?;
  Ok(ExitCode::SUCCESS)
}
