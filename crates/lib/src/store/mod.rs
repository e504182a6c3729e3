//! Read-only access to the live content store.
//!
//! The engine never mutates the store. It only needs to resolve an item by
//! identifier within a partition and to list an item's children in order.
//!
//! Implementations must be `Sync` so partitions can be reconciled in
//! parallel. Whether every call sees the same consistent view depends on the
//! implementation; [`JsonStore`] is an immutable snapshot and always does.

mod json;

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub use json::{JsonStore, StoreNode, StoreSnapshot};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("unknown partition '{0}'")]
  UnknownPartition(String),

  #[error("item {id} is not in partition '{partition}'")]
  UnknownItem { partition: String, id: String },

  #[error("identifier {id} appears more than once in partition '{partition}'")]
  DuplicateId { partition: String, id: String },

  #[error("failed to read store snapshot {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse store snapshot: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("store backend failed: {0}")]
  Backend(String),
}

/// A node of the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveItem {
  pub id: String,
  pub name: String,
  pub full_path: String,
}

pub trait ContentStore: Sync {
  /// Resolve an item by identifier. Not finding it is `Ok(None)`, not an error.
  fn get_item(&self, partition: &str, id: &str) -> Result<Option<LiveItem>, StoreError>;

  /// Children of `item` in store order.
  fn children(&self, partition: &str, item: &LiveItem) -> Result<Vec<LiveItem>, StoreError>;
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
  fn get_item(&self, partition: &str, id: &str) -> Result<Option<LiveItem>, StoreError> {
    (**self).get_item(partition, id)
  }

  fn children(&self, partition: &str, item: &LiveItem) -> Result<Vec<LiveItem>, StoreError> {
    (**self).children(partition, item)
  }
}
