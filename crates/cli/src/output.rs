//! CLI output formatting utilities.
//!
//! Colored status lines, change markers, and JSON printing.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use shipreport_lib::ChangeType;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

/// `[ADD]`-style marker, colored by change type.
pub fn change_marker(change: ChangeType) -> String {
  let marker = format!("[{}]", change.code());
  match change {
    ChangeType::Add => marker.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
    ChangeType::Update => marker.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
    ChangeType::Ignore => marker.if_supports_color(Stream::Stdout, |s| s.dimmed()).to_string(),
    ChangeType::Delete => marker.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
  }
}

/// `----- MASTER -----`
pub fn print_header(title: &str) {
  let header = format!("----- {} -----", title.to_uppercase());
  println!("{}", header.if_supports_color(Stream::Stdout, |s| s.bold()));
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
