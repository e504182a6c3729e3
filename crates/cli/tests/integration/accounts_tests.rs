//! Accounts command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::{TestEnv, release_entries};

#[test]
fn accounts_lists_package_accounts() {
  let env = TestEnv::new();
  let package = env.write_package("release.zip", &release_entries());

  env
    .shipreport_cmd()
    .arg("accounts")
    .arg(&package)
    .assert()
    .success()
    .stdout(predicate::str::contains("sitecore\\jdoe"))
    .stdout(predicate::str::contains("sitecore\\Authors"))
    .stdout(predicate::str::contains("sitecore\\admin skipped"));
}

#[test]
fn accounts_json_summary() {
  let env = TestEnv::new();
  let mut entries = release_entries();
  entries.push(("security/unknown".to_string(), b"x".to_vec()));
  let package = env.write_update("release.update", &entries);

  let output = env
    .shipreport_cmd()
    .args(["accounts", "-o", "json"])
    .arg(&package)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["installed"].as_array().unwrap().len(), 2);
  assert_eq!(json["skipped"][0]["account"], "sitecore\\admin");
  assert_eq!(json["rejected"][0], "security/unknown");
  assert_eq!(env.leftover_workdirs(), 0);
}

#[test]
fn accounts_package_without_security_entries() {
  let env = TestEnv::new();
  let package = env.write_package("empty.zip", &[("readme.txt".to_string(), b"x".to_vec())]);

  env
    .shipreport_cmd()
    .arg("accounts")
    .arg(&package)
    .assert()
    .success()
    .stdout(predicate::str::contains("No security accounts"));
}

#[test]
fn accounts_missing_package_fails() {
  let env = TestEnv::new();

  env
    .shipreport_cmd()
    .arg("accounts")
    .arg(env.path("absent.zip"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot find package file"));
}
