//! Per-partition reconciliation of declared entries against the live store.
//!
//! Each declared entry is classified as added, updated or ignored. Updated
//! entries that keep their children in sync (and only when the manifest allows
//! deletions at all) become roots of a deletion scan: every live descendant
//! whose identifier is not declared anywhere in the partition is reported as
//! deleted together with its whole subtree.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::collision::{CollisionBehavior, CollisionError, classify_collision};
use crate::ident::{child_path, normalize_id, strip_item_suffix};
use crate::manifest::DeclaredEntry;
use crate::report::{ChangeType, ReportEntry};
use crate::store::{ContentStore, LiveItem, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Collision(#[from] CollisionError),
}

/// Reconciles one partition.
pub struct PartitionReconciler<'a, S: ContentStore + ?Sized> {
  store: &'a S,
  partition: &'a str,
  items_dir: &'a Path,
  item_suffix: &'a str,
  can_delete_items: bool,
}

impl<'a, S: ContentStore + ?Sized> PartitionReconciler<'a, S> {
  pub fn new(store: &'a S, partition: &'a str, items_dir: &'a Path, item_suffix: &'a str) -> Self {
    Self {
      store,
      partition,
      items_dir,
      item_suffix,
      can_delete_items: false,
    }
  }

  /// Whether the manifest allows deletions.
  pub fn can_delete_items(mut self, can_delete_items: bool) -> Self {
    self.can_delete_items = can_delete_items;
    self
  }

  /// Classify `entries` and collect cascading deletions, sorted by path.
  pub fn reconcile(&self, entries: &[&DeclaredEntry]) -> Result<Vec<ReportEntry>, ReconcileError> {
    let declared: HashSet<String> = entries.iter().map(|e| e.normalized_id()).collect();
    let mut report = Vec::with_capacity(entries.len());
    let mut scan_roots = Vec::new();

    for entry in entries {
      let id = entry.normalized_id();
      match self.store.get_item(self.partition, &entry.id)? {
        None => {
          let full_path = self.added_path(entry)?;
          report.push(ReportEntry::new(full_path, id, ChangeType::Add));
        }
        Some(live) => match classify_collision(self.items_dir, entry)? {
          CollisionBehavior::Skip => {
            report.push(ReportEntry::new(live.full_path.clone(), id, ChangeType::Ignore));
          }
          CollisionBehavior::Overwrite => {
            report.push(ReportEntry::new(live.full_path.clone(), id, ChangeType::Update));
            if entry.can_delete_children && self.can_delete_items {
              scan_roots.push(live);
            }
          }
        },
      }
    }

    // Ancestors first, so every subtree is first reached from its outermost
    // scan root and inherits the strongest orphan state.
    scan_roots.sort_by(|a, b| a.full_path.cmp(&b.full_path));
    let deletions = self.collect_deletions(&scan_roots, &declared)?;
    report.extend(deletions);
    sort_entries(&mut report);

    info!(
      partition = self.partition,
      entries = report.len(),
      scanned = scan_roots.len(),
      "reconciled partition"
    );
    Ok(report)
  }

  /// Display path of an item the store does not hold yet.
  ///
  /// Resolved against the declared parent when it exists live, otherwise the
  /// bare name.
  fn added_path(&self, entry: &DeclaredEntry) -> Result<String, StoreError> {
    let name = strip_item_suffix(&entry.name, self.item_suffix);
    let parent = match &entry.parent_id {
      Some(parent_id) => self.store.get_item(self.partition, parent_id)?,
      None => None,
    };
    Ok(match parent {
      Some(parent) => child_path(&parent.full_path, name),
      None => name.to_string(),
    })
  }

  /// Walk the live subtrees below `roots`.
  ///
  /// A node not in `declared` is deleted along with everything below it. A
  /// declared node is kept but its children are still checked.
  fn collect_deletions(
    &self,
    roots: &[LiveItem],
    declared: &HashSet<String>,
  ) -> Result<Vec<ReportEntry>, StoreError> {
    let mut deletions = Vec::new();
    let mut visited = HashSet::new();
    // (item, inside an orphaned subtree)
    let mut pending: Vec<(LiveItem, bool)> = Vec::new();

    for root in roots {
      visited.insert(normalize_id(&root.id));
      for child in self.store.children(self.partition, root)?.into_iter().rev() {
        pending.push((child, false));
      }

      while let Some((item, orphaned)) = pending.pop() {
        let id = normalize_id(&item.id);
        if !visited.insert(id.clone()) {
          continue;
        }

        let orphaned = orphaned || !declared.contains(&id);
        for child in self.store.children(self.partition, &item)?.into_iter().rev() {
          pending.push((child, orphaned));
        }
        if orphaned {
          deletions.push(ReportEntry::new(item.full_path, id, ChangeType::Delete));
        }
      }
    }

    Ok(deletions)
  }
}

/// Order entries by path, then identifier, then change type.
pub fn sort_entries(entries: &mut [ReportEntry]) {
  entries.sort_by(|a, b| {
    a.full_path
      .cmp(&b.full_path)
      .then_with(|| a.id.cmp(&b.id))
      .then_with(|| a.change_type.cmp(&b.change_type))
  });
}
