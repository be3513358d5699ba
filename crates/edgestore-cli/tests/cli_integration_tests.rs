//! End-to-end tests of the edgestore binary against an on-disk database

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn edgestore(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("edgestore").unwrap();
    cmd.arg("--db").arg(dir.path().join("graph.db"));
    cmd.env_remove("EDGESTORE_CONFIG");
    cmd
}

fn add(dir: &TempDir, source: &str, destination: &str, relationship_type: &str) {
    edgestore(dir)
        .args(["add-edge", source, destination, relationship_type])
        .assert()
        .success();
}

#[test]
fn test_lineage_round_trip_through_the_binary() {
    let dir = TempDir::new().unwrap();
    add(&dir, "urn:li:dataset:d2", "urn:li:dataset:d1", "DownstreamOf");
    add(&dir, "urn:li:dataset:d3", "urn:li:dataset:d2", "DownstreamOf");
    add(&dir, "urn:li:dataset:d1", "urn:li:corpuser:u1", "HasOwner");

    edgestore(&dir)
        .args(["related", "-t", "DownstreamOf", "--source-type", "dataset"])
        .assert()
        .success()
        .stdout("urn:li:dataset:d1\nurn:li:dataset:d2\n");

    edgestore(&dir)
        .args(["types"])
        .assert()
        .success()
        .stdout("DownstreamOf\nHasOwner\n");

    edgestore(&dir)
        .args(["remove-node", "urn:li:dataset:d2"])
        .assert()
        .success();

    edgestore(&dir)
        .args(["related", "-t", "DownstreamOf", "--source-type", "dataset"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_remove_edges_by_direction() {
    let dir = TempDir::new().unwrap();
    add(&dir, "urn:li:dataset:a", "urn:li:corpuser:u", "HasOwner");
    add(&dir, "urn:li:dataset:b", "urn:li:corpuser:u", "HasOwner");

    edgestore(&dir)
        .args([
            "remove-edges",
            "urn:li:corpuser:u",
            "-t",
            "HasOwner",
            "--direction",
            "outgoing",
        ])
        .assert()
        .success();

    edgestore(&dir)
        .args([
            "related",
            "-t",
            "HasOwner",
            "--source-urn",
            "urn:li:corpuser:u",
            "--direction",
            "incoming",
        ])
        .assert()
        .success()
        .stdout("urn:li:dataset:a\nurn:li:dataset:b\n");

    edgestore(&dir)
        .args([
            "remove-edges",
            "urn:li:corpuser:u",
            "-t",
            "HasOwner",
            "--direction",
            "incoming",
        ])
        .assert()
        .success();

    edgestore(&dir).args(["types"]).assert().success().stdout("");
}

#[test]
fn test_clear_empties_the_store() {
    let dir = TempDir::new().unwrap();
    add(&dir, "urn:li:dataset:a", "urn:li:corpuser:u", "HasOwner");

    edgestore(&dir).arg("clear").assert().success();
    edgestore(&dir).args(["types"]).assert().success().stdout("");
}

#[test]
fn test_invalid_urn_fails() {
    let dir = TempDir::new().unwrap();
    edgestore(&dir)
        .args(["add-edge", "dataset-a", "urn:li:dataset:b", "DownstreamOf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid URN"));
}

#[test]
fn test_negative_paging_fails() {
    let dir = TempDir::new().unwrap();
    edgestore(&dir)
        .args(["related", "-t", "HasOwner", "--count", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("count must be non-negative"));
}
