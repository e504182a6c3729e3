//! Properties of partition reconciliation over generated live trees.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use proptest::prelude::*;
use proptest::sample::Index;
use tempfile::TempDir;

use shipreport_lib::ident::item_file_name;
use shipreport_lib::manifest::DeclaredEntry;
use shipreport_lib::reconcile::PartitionReconciler;
use shipreport_lib::store::{StoreNode, StoreSnapshot};
use shipreport_lib::{ChangeType, JsonStore, ReportEntry};

/// A generated tree: `parents[i]` is the parent of node `i + 1`; node 0 is the root.
#[derive(Debug, Clone)]
struct Tree {
  parents: Vec<usize>,
  declared: Vec<bool>,
  synced: Vec<bool>,
}

impl Tree {
  fn len(&self) -> usize {
    self.parents.len() + 1
  }

  fn parent(&self, node: usize) -> Option<usize> {
    if node == 0 { None } else { Some(self.parents[node - 1]) }
  }

  fn id(node: usize) -> String {
    format!("{{N{}}}", node)
  }

  fn normalized(node: usize) -> String {
    format!("n{}", node)
  }

  fn store_node(&self, node: usize) -> StoreNode {
    let mut built = StoreNode::new(&Self::id(node), &format!("n{}", node));
    for child in 1..self.len() {
      if self.parent(child) == Some(node) {
        built = built.child(self.store_node(child));
      }
    }
    built
  }

  fn store(&self) -> JsonStore {
    JsonStore::from_snapshot(&StoreSnapshot::new().partition("master", vec![self.store_node(0)])).unwrap()
  }

  fn entries(&self, items_dir: &Path) -> Vec<DeclaredEntry> {
    (0..self.len())
      .filter(|&node| self.declared[node])
      .map(|node| {
        let id = Self::id(node);
        let name = format!("n{}.item", node);
        let item_file = item_file_name(&name, &id, ".item");
        fs::write(
          items_dir.join(&item_file),
          "<item><CollisionBehavior Overwrite=\"true\" /></item>",
        )
        .unwrap();
        DeclaredEntry {
          id,
          name,
          parent_id: self.parent(node).map(Self::id),
          partition: "master".to_string(),
          can_delete_children: self.synced[node],
          item_file,
        }
      })
      .collect()
  }

  /// Reference rule: a node is deleted when some declared, synced ancestor
  /// reaches it through at least one undeclared node (the node itself included).
  fn expected_deleted(&self) -> HashSet<String> {
    let mut deleted = HashSet::new();
    for node in 1..self.len() {
      let mut crossed_undeclared = !self.declared[node];
      let mut ancestor = self.parent(node);
      while let Some(a) = ancestor {
        if self.declared[a] && self.synced[a] && crossed_undeclared {
          deleted.insert(Self::normalized(node));
          break;
        }
        crossed_undeclared |= !self.declared[a];
        ancestor = self.parent(a);
      }
    }
    deleted
  }
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
  prop::collection::vec((any::<Index>(), any::<bool>(), any::<bool>()), 0..24).prop_map(|nodes| {
    let mut tree = Tree {
      parents: Vec::new(),
      declared: vec![true],
      synced: vec![true],
    };
    for (i, (parent, declared, synced)) in nodes.into_iter().enumerate() {
      tree.parents.push(parent.index(i + 1));
      tree.declared.push(declared);
      tree.synced.push(synced);
    }
    tree
  })
}

fn reconcile(tree: &Tree, reversed: bool) -> Vec<ReportEntry> {
  let items = TempDir::new().unwrap();
  let store = tree.store();
  let mut entries = tree.entries(items.path());
  if reversed {
    entries.reverse();
  }
  let refs: Vec<&DeclaredEntry> = entries.iter().collect();
  PartitionReconciler::new(&store, "master", items.path(), ".item")
    .can_delete_items(true)
    .reconcile(&refs)
    .unwrap()
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn deletions_match_reference_rule(tree in tree_strategy()) {
    let report = reconcile(&tree, false);
    let deleted: HashSet<String> = report
      .iter()
      .filter(|e| e.change_type == ChangeType::Delete)
      .map(|e| e.id.clone())
      .collect();
    prop_assert_eq!(deleted, tree.expected_deleted());
  }

  #[test]
  fn deleted_items_take_their_subtrees(tree in tree_strategy()) {
    let report = reconcile(&tree, false);
    let deleted: HashSet<String> = report
      .iter()
      .filter(|e| e.change_type == ChangeType::Delete)
      .map(|e| e.id.clone())
      .collect();
    for node in 1..tree.len() {
      if let Some(parent) = tree.parent(node) {
        if deleted.contains(&Tree::normalized(parent)) {
          prop_assert!(deleted.contains(&Tree::normalized(node)));
        }
      }
    }
  }

  #[test]
  fn rows_are_unique_and_declared_items_reported_once(tree in tree_strategy()) {
    let report = reconcile(&tree, false);
    let mut per_type: HashMap<(String, ChangeType), usize> = HashMap::new();
    for entry in &report {
      *per_type.entry((entry.id.clone(), entry.change_type)).or_default() += 1;
    }
    prop_assert!(per_type.values().all(|&count| count == 1));

    for node in 0..tree.len() {
      let updated = per_type.contains_key(&(Tree::normalized(node), ChangeType::Update));
      prop_assert_eq!(updated, tree.declared[node]);
    }
  }

  #[test]
  fn output_ignores_declaration_order(tree in tree_strategy()) {
    prop_assert_eq!(reconcile(&tree, false), reconcile(&tree, true));
  }
}
