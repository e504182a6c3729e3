//! Report command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::{MANIFEST_ENTRY, STORE_JSON, TestEnv, release_entries};

fn report_json(output: &[u8]) -> Value {
  serde_json::from_slice(output).expect("report output is JSON")
}

#[test]
fn report_text_lists_changes_per_partition() {
  let env = TestEnv::new();
  let package = env.write_package("release.zip", &release_entries());
  let store = env.write_store(STORE_JSON);

  env
    .shipreport_cmd()
    .arg("report")
    .arg(&package)
    .arg("--store")
    .arg(&store)
    .assert()
    .success()
    .stdout(predicate::str::contains("----- MASTER -----"))
    .stdout(predicate::str::contains("[ADD] /home/A1 a1"))
    .stdout(predicate::str::contains("[UPD] /home/B2 b2"))
    .stdout(predicate::str::contains("[DEL] /home/B2/C3 c3"))
    .stdout(predicate::str::contains("[DEL] /home/B2/C3/D4 d4"))
    .stdout(predicate::str::contains("[IGNORE] /site w1"));

  assert_eq!(env.leftover_workdirs(), 0);
}

#[test]
fn report_json_has_expected_shape() {
  let env = TestEnv::new();
  let package = env.write_package("release.zip", &release_entries());
  let store = env.write_store(STORE_JSON);

  let output = env
    .shipreport_cmd()
    .args(["report", "-o", "json", "--store"])
    .arg(&store)
    .arg(&package)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json = report_json(&output.stdout);
  assert_eq!(json["error"], Value::Null);
  assert_eq!(json["canDeleteItems"], true);

  let partitions = json["partitions"].as_array().unwrap();
  let names: Vec<_> = partitions.iter().map(|p| p["name"].as_str().unwrap()).collect();
  assert_eq!(names, vec!["core", "master", "web"]);

  let master: Vec<_> = partitions[1]["entries"]
    .as_array()
    .unwrap()
    .iter()
    .map(|e| format!("{} {}", e["changeType"].as_str().unwrap(), e["fullPath"].as_str().unwrap()))
    .collect();
  assert_eq!(
    master,
    vec!["ADD /home/A1", "UPD /home/B2", "DEL /home/B2/C3", "DEL /home/B2/C3/D4"]
  );
}

#[test]
fn report_update_package_matches_simple_package() {
  let env = TestEnv::new();
  let simple = env.write_package("release.zip", &release_entries());
  let wrapped = env.write_update("release.update", &release_entries());
  let store = env.write_store(STORE_JSON);

  let run = |package: &std::path::Path| {
    env
      .shipreport_cmd()
      .args(["report", "-o", "json", "--store"])
      .arg(&store)
      .arg(package)
      .output()
      .unwrap()
      .stdout
  };

  assert_eq!(report_json(&run(&simple)), report_json(&run(&wrapped)));
}

#[test]
fn report_parallel_output_is_identical() {
  let env = TestEnv::new();
  let package = env.write_package("release.zip", &release_entries());
  let store = env.write_store(STORE_JSON);

  let run = |parallel: bool| {
    let mut cmd = env.shipreport_cmd();
    cmd.args(["report", "-o", "json", "--store"]).arg(&store).arg(&package);
    if parallel {
      cmd.arg("--parallel");
    }
    cmd.output().unwrap().stdout
  };

  assert_eq!(run(false), run(true));
}

#[test]
fn report_summary_only_empties_entries() {
  let env = TestEnv::new();
  let package = env.write_package("release.zip", &release_entries());
  let store = env.write_store(STORE_JSON);

  let output = env
    .shipreport_cmd()
    .args(["report", "--summary", "-o", "json", "--store"])
    .arg(&store)
    .arg(&package)
    .output()
    .unwrap();

  let json = report_json(&output.stdout);
  let master = &json["partitions"][1];
  assert_eq!(master["entries"].as_array().unwrap().len(), 0);
  assert_eq!(master["summary"]["added"], 1);
  assert_eq!(master["summary"]["deleted"], 2);
}

#[test]
fn report_missing_package_fails_with_error_field() {
  let env = TestEnv::new();
  let store = env.write_store(STORE_JSON);

  let output = env
    .shipreport_cmd()
    .args(["report", "-o", "json", "--store"])
    .arg(&store)
    .arg(env.path("absent.zip"))
    .output()
    .unwrap();

  assert_eq!(output.status.code(), Some(1));
  let json = report_json(&output.stdout);
  assert!(json["error"].as_str().is_some_and(|e| e.contains("cannot find package file")));
  assert_eq!(json["partitions"].as_array().unwrap().len(), 0);
}

#[test]
fn report_missing_manifest_fails() {
  let env = TestEnv::new();
  let package = env.write_package("bare.zip", &[("readme.txt".to_string(), b"x".to_vec())]);
  let store = env.write_store(STORE_JSON);

  env
    .shipreport_cmd()
    .arg("report")
    .arg(&package)
    .arg("--store")
    .arg(&store)
    .assert()
    .failure()
    .stderr(predicate::str::contains("ArchiveEntryMissing"))
    .stderr(predicate::str::contains(MANIFEST_ENTRY));

  assert_eq!(env.leftover_workdirs(), 0);
}

#[test]
fn report_respects_partition_config() {
  let env = TestEnv::new();
  let package = env.write_package("release.zip", &release_entries());
  let store = env.write_store(STORE_JSON);
  env.write_config(r#"{ "partitions": ["web"] }"#);

  let output = env
    .shipreport_cmd()
    .args(["report", "-o", "json", "--store"])
    .arg(&store)
    .arg(&package)
    .output()
    .unwrap();

  let json = report_json(&output.stdout);
  let partitions = json["partitions"].as_array().unwrap();
  assert_eq!(partitions.len(), 1);
  assert_eq!(partitions[0]["name"], "web");
}

#[test]
fn report_bad_store_snapshot_is_an_error() {
  let env = TestEnv::new();
  let package = env.write_package("release.zip", &release_entries());
  let store = env.write_store("not json");

  env
    .shipreport_cmd()
    .arg("report")
    .arg(&package)
    .arg("--store")
    .arg(&store)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load store snapshot"));
}
