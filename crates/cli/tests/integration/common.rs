//! Shared test helpers for CLI integration tests.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const MANIFEST_ENTRY: &str = "addedfiles/_DEV/DeployedItems.xml";

/// Build a zip archive in memory from `(name, bytes)` pairs.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
  let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
  let options = SimpleFileOptions::default();
  for (name, bytes) in entries {
    writer.start_file(*name, options).unwrap();
    writer.write_all(bytes).unwrap();
  }
  writer.finish().unwrap().into_inner()
}

pub fn item_xml(overwrite: bool) -> Vec<u8> {
  format!("<item><CollisionBehavior Overwrite=\"{}\" /></item>", overwrite).into_bytes()
}

/// The sample release used across tests.
///
/// master: adds A1 under /home, updates B2 (kept in sync, so its undeclared
/// child C3 and grandchild D4 are deleted). web: W1 is deploy-once.
pub fn release_entries() -> Vec<(String, Vec<u8>)> {
  let manifest = r#"<?xml version="1.0" encoding="utf-8"?>
<DeployedItems RecursiveDeployAction="Delete">
  <DeployedItem Id="{A1}" Name="A1.item" Parent="{P0}" Database="master" />
  <DeployedItem Id="{B2}" Name="B2.item" Parent="{P0}" Database="master" KeepChildrenInSync="true" />
  <DeployedItem Id="{W1}" Name="site.item" Database="web" />
</DeployedItems>
"#;
  vec![
    (MANIFEST_ENTRY.to_string(), manifest.as_bytes().to_vec()),
    ("addeditems/master/items/sitecore/home/A1_{A1}".to_string(), item_xml(true)),
    ("addeditems/master/items/sitecore/home/B2_{B2}".to_string(), item_xml(true)),
    ("addeditems/web/items/sitecore/site_{W1}".to_string(), item_xml(false)),
    ("security/users/sitecore/jdoe".to_string(), b"<user />".to_vec()),
    ("security/users/sitecore/admin".to_string(), b"<user />".to_vec()),
    ("security/roles/sitecore/Authors".to_string(), b"<role />".to_vec()),
  ]
}

pub const STORE_JSON: &str = r#"{
  "partitions": {
    "core": [],
    "master": [
      { "id": "{P0}", "name": "home", "children": [
        { "id": "{B2}", "name": "B2", "children": [
          { "id": "{C3}", "name": "C3", "children": [ { "id": "{D4}", "name": "D4" } ] }
        ] }
      ] }
    ],
    "web": [ { "id": "{W1}", "name": "site" } ]
  }
}"#;

/// Isolated test environment.
///
/// Each test gets its own temporary directory for packages, the store
/// snapshot, config, and extraction work directories.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a simple package.
  pub fn write_package(&self, name: &str, entries: &[(String, Vec<u8>)]) -> PathBuf {
    let refs: Vec<(&str, &[u8])> = entries.iter().map(|(n, b)| (n.as_str(), b.as_slice())).collect();
    let path = self.path(name);
    std::fs::write(&path, zip_bytes(&refs)).unwrap();
    path
  }

  /// Write a package wrapped in an update archive.
  pub fn write_update(&self, name: &str, entries: &[(String, Vec<u8>)]) -> PathBuf {
    let refs: Vec<(&str, &[u8])> = entries.iter().map(|(n, b)| (n.as_str(), b.as_slice())).collect();
    let inner = zip_bytes(&refs);
    let outer = zip_bytes(&[
      ("metadata/sc_name.txt", b"release".as_slice()),
      ("package.zip", inner.as_slice()),
    ]);
    let path = self.path(name);
    std::fs::write(&path, outer).unwrap();
    path
  }

  pub fn write_store(&self, json: &str) -> PathBuf {
    let path = self.path("store.json");
    std::fs::write(&path, json).unwrap();
    path
  }

  pub fn work_path(&self) -> PathBuf {
    let p = self.path("work");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Number of extraction directories left behind.
  pub fn leftover_workdirs(&self) -> usize {
    std::fs::read_dir(self.work_path()).unwrap().count()
  }

  /// Write the per-user config file the CLI picks up from the config home.
  pub fn write_config(&self, json: &str) {
    let dir = self.path("xdg").join("shipreport");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.json"), json).unwrap();
  }

  /// Get a pre-configured Command for the shipreport binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `SHIPREPORT_TEMP_DIR`: Isolated extraction root
  /// - `SHIPREPORT_CONFIG`: Removed, so the isolated config home is consulted
  /// - `XDG_CONFIG_HOME`: Isolated config home (see [`TestEnv::write_config`])
  pub fn shipreport_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("shipreport");
    cmd.env("SHIPREPORT_TEMP_DIR", self.work_path());
    cmd.env_remove("SHIPREPORT_CONFIG");
    cmd.env("XDG_CONFIG_HOME", self.path("xdg"));
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
