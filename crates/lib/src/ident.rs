//! Identifier and path normalization.
//!
//! Every comparison between a manifest identifier and a live store identifier
//! goes through [`normalize_id`], and every item definition file name is
//! derived with [`item_file_name`]. Manifests write identifiers as
//! `{A1B2...}` while stores and archive paths use other conventions, so the
//! rules here are the only place that knows about casing and braces.

use std::path::Path;

/// Canonicalize an identifier for equality comparisons.
///
/// Trims surrounding whitespace, lower-cases, and strips enclosing braces.
/// The result is never brace-enclosed, so normalizing twice is a no-op.
pub fn normalize_id(id: &str) -> String {
  let mut normalized = id.trim().to_lowercase();
  while normalized.len() >= 2 && normalized.starts_with('{') && normalized.ends_with('}') {
    normalized = normalized[1..normalized.len() - 1].trim().to_string();
  }
  normalized
}

/// Remove the item file-type suffix from a declared name, if present.
pub fn strip_item_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
  name.strip_suffix(suffix).unwrap_or(name)
}

/// Name of the flattened item definition file for a declared entry.
///
/// `Home.item` with id `{AB-12}` becomes `home_{ab-12}`.
pub fn item_file_name(name: &str, id: &str, suffix: &str) -> String {
  format!("{}_{{{}}}", strip_item_suffix(name, suffix), normalize_id(id)).to_lowercase()
}

/// Flattened file name for an archive entry: its last path segment, lower-cased.
///
/// Returns `None` for entries that name a directory, a relative component, or
/// nothing at all.
pub fn flatten_entry_name(entry: &str) -> Option<String> {
  if entry.ends_with('/') || entry.ends_with('\\') {
    return None;
  }
  entry
    .rsplit(['/', '\\'])
    .next()
    .filter(|segment| !matches!(*segment, "" | "." | ".."))
    .map(str::to_lowercase)
}

/// Join a live item path and a child name for display.
pub fn child_path(parent_path: &str, name: &str) -> String {
  format!("{}/{}", parent_path.trim_end_matches('/'), name)
}

/// Whether a package path names an update wrapper rather than a simple package.
pub fn is_update_package(path: &Path, update_suffix: &str) -> bool {
  path
    .to_string_lossy()
    .trim()
    .to_lowercase()
    .ends_with(&update_suffix.to_lowercase())
}
