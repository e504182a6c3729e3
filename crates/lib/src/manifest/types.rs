use serde::Serialize;

use crate::ident::normalize_id;

/// One change declared by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredEntry {
  /// Identifier as written in the manifest.
  pub id: String,
  /// Declared name, possibly carrying the item file-type suffix.
  pub name: String,
  pub parent_id: Option<String>,
  pub partition: String,
  /// The entry asks for live children to be kept in sync with the package.
  pub can_delete_children: bool,
  /// Flattened file name of this entry's item definition.
  pub item_file: String,
}

impl DeclaredEntry {
  pub fn normalized_id(&self) -> String {
    normalize_id(&self.id)
  }
}

/// A parsed manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployManifest {
  /// The package may delete live items at all.
  pub can_delete_items: bool,
  /// Entries in document order.
  pub entries: Vec<DeclaredEntry>,
}

impl DeployManifest {
  /// Entries declared for one partition, in document order.
  pub fn partition_entries(&self, partition: &str) -> Vec<&DeclaredEntry> {
    self.entries.iter().filter(|e| e.partition == partition).collect()
  }
}
