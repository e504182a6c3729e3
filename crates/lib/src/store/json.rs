use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ident::{child_path, normalize_id};

use super::{ContentStore, LiveItem, StoreError};

/// Serialized form of a store snapshot.
///
/// ```json
/// { "partitions": { "master": [ { "id": "{..}", "name": "home", "children": [] } ] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
  pub partitions: BTreeMap<String, Vec<StoreNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreNode {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<StoreNode>,
}

impl StoreNode {
  pub fn new(id: &str, name: &str) -> Self {
    Self {
      id: id.to_string(),
      name: name.to_string(),
      children: Vec::new(),
    }
  }

  pub fn child(mut self, child: StoreNode) -> Self {
    self.children.push(child);
    self
  }
}

impl StoreSnapshot {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn partition(mut self, name: &str, roots: Vec<StoreNode>) -> Self {
    self.partitions.insert(name.to_string(), roots);
    self
  }
}

#[derive(Debug)]
struct IndexedItem {
  item: LiveItem,
  children: Vec<usize>,
}

#[derive(Debug, Default)]
struct PartitionIndex {
  items: Vec<IndexedItem>,
  by_id: HashMap<String, usize>,
}

impl PartitionIndex {
  fn build(partition: &str, roots: &[StoreNode]) -> Result<Self, StoreError> {
    let mut index = PartitionIndex::default();
    // (node, parent slot, parent path)
    let mut pending: Vec<(&StoreNode, Option<usize>, String)> =
      roots.iter().rev().map(|node| (node, None, String::new())).collect();

    while let Some((node, parent, parent_path)) = pending.pop() {
      let key = normalize_id(&node.id);
      if index.by_id.contains_key(&key) {
        return Err(StoreError::DuplicateId {
          partition: partition.to_string(),
          id: node.id.clone(),
        });
      }

      let full_path = child_path(&parent_path, &node.name);
      let slot = index.items.len();
      index.items.push(IndexedItem {
        item: LiveItem {
          id: node.id.clone(),
          name: node.name.clone(),
          full_path: full_path.clone(),
        },
        children: Vec::new(),
      });
      index.by_id.insert(key, slot);
      if let Some(parent) = parent {
        index.items[parent].children.push(slot);
      }

      for child in node.children.iter().rev() {
        pending.push((child, Some(slot), full_path.clone()));
      }
    }

    Ok(index)
  }
}

/// An immutable in-memory store loaded from a JSON snapshot.
#[derive(Debug, Default)]
pub struct JsonStore {
  partitions: HashMap<String, PartitionIndex>,
}

impl JsonStore {
  pub fn from_snapshot(snapshot: &StoreSnapshot) -> Result<Self, StoreError> {
    let mut partitions = HashMap::new();
    for (name, roots) in &snapshot.partitions {
      let index = PartitionIndex::build(name, roots)?;
      debug!(partition = %name, items = index.items.len(), "indexed store partition");
      partitions.insert(name.clone(), index);
    }
    Ok(Self { partitions })
  }

  pub fn from_json(json: &str) -> Result<Self, StoreError> {
    let snapshot: StoreSnapshot = serde_json::from_str(json).map_err(StoreError::Parse)?;
    Self::from_snapshot(&snapshot)
  }

  pub fn from_file(path: &Path) -> Result<Self, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  fn partition(&self, partition: &str) -> Result<&PartitionIndex, StoreError> {
    self
      .partitions
      .get(partition)
      .ok_or_else(|| StoreError::UnknownPartition(partition.to_string()))
  }
}

impl ContentStore for JsonStore {
  fn get_item(&self, partition: &str, id: &str) -> Result<Option<LiveItem>, StoreError> {
    let index = self.partition(partition)?;
    Ok(
      index
        .by_id
        .get(&normalize_id(id))
        .map(|&slot| index.items[slot].item.clone()),
    )
  }

  fn children(&self, partition: &str, item: &LiveItem) -> Result<Vec<LiveItem>, StoreError> {
    let index = self.partition(partition)?;
    let slot = index
      .by_id
      .get(&normalize_id(&item.id))
      .copied()
      .ok_or_else(|| StoreError::UnknownItem {
        partition: partition.to_string(),
        id: item.id.clone(),
      })?;
    Ok(
      index.items[slot]
        .children
        .iter()
        .map(|&child| index.items[child].item.clone())
        .collect(),
    )
  }
}
