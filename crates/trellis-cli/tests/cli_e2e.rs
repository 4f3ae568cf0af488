//! End-to-end tests for the `trl` binary
//!
//! Every test works on its own temporary address book, so state only carries
//! over between invocations inside a single test.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    config: PathBuf,
    data_file: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("addressbook.json");
        let config = dir.path().join("config.toml");
        fs::write(
            &config,
            format!(
                "[storage]\ndata_file = {:?}\n\n[logging]\nlevel = \"off\"\n",
                data_file.display().to_string()
            ),
        )
        .unwrap();
        Self {
            _dir: dir,
            config,
            data_file,
        }
    }

    fn trl(&self) -> Command {
        let mut cmd = Command::cargo_bin("trl").unwrap();
        cmd.env_remove("TRELLIS_DATA_FILE")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self.trl().args(args).assert().success().get_output().clone();
        String::from_utf8(output.stdout).unwrap()
    }

    fn university(&self) {
        for (parent, child) in [
            ("nus", "computing"),
            ("nus", "science"),
            ("computing", "sciencecomp"),
            ("science", "sciencecomp"),
            ("sciencecomp", "cs1231s"),
            ("sciencecomp", "ma1101r"),
        ] {
            self.run(&["tag", "link", parent, child]);
        }
        self.run(&["contact", "add", "Irfan Ibrahim", "-t", "cs1231s", "-t", "classmates"]);
        self.run(&["contact", "add", "Roy Balakrishnan", "--tag", "science"]);
        self.run(&["contact", "add", "Charlotte Oliveiro", "-t", "classmates"]);
    }
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("trl").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_read_only_command_does_not_create_file() {
    let ws = Workspace::new();

    ws.trl()
        .args(["contact", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No contacts found."));
    assert!(!ws.data_file.exists());
}

#[test]
fn test_data_file_flag_overrides_config() {
    let ws = Workspace::new();
    let other = ws.data_file.with_file_name("other.json");

    ws.trl()
        .arg("--data-file")
        .arg(&other)
        .args(["contact", "add", "Alex Yeoh"])
        .assert()
        .success();

    assert!(other.exists());
    assert!(!ws.data_file.exists());
}

// ============================================================================
// Contacts
// ============================================================================

#[test]
fn test_contacts_persist_between_runs() {
    let ws = Workspace::new();

    ws.trl()
        .args(["contact", "add", "Alex Yeoh", "-p", "87438807", "-t", "Friends"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New contact added: #0 Alex Yeoh"));

    let listing = ws.run(&["contact", "list"]);
    assert!(listing.contains("87438807"));
    assert!(listing.contains("friends"));
    assert!(listing.contains("1 contact(s) listed."));
}

#[test]
fn test_duplicate_contact_is_rejected() {
    let ws = Workspace::new();
    ws.run(&["contact", "add", "Alex Yeoh"]);

    ws.trl()
        .args(["contact", "add", "alex yeoh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_tag_and_untag_contact() {
    let ws = Workspace::new();
    ws.run(&["contact", "add", "Alex Yeoh"]);

    ws.run(&["contact", "tag", "0", "friends", "colleagues"]);
    ws.trl()
        .args(["contact", "tag", "0", "friends"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has tag 'friends'"));

    ws.run(&["contact", "untag", "0", "friends"]);
    let members = ws.run(&["tag", "members", "colleagues"]);
    assert!(members.contains("Alex Yeoh"));

    ws.trl()
        .args(["tag", "members", "friends"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tag 'friends' does not exist"));
}

// ============================================================================
// Tag hierarchy
// ============================================================================

#[test]
fn test_recursive_listing_under_super_tag() {
    let ws = Workspace::new();
    ws.university();

    let direct = ws.run(&["contact", "list", "--tag", "nus"]);
    assert!(direct.contains("No contacts found."));

    let recursive = ws.run(&["contact", "list", "--tag", "nus", "--recursive"]);
    assert!(recursive.contains("Irfan Ibrahim"));
    assert!(recursive.contains("Roy Balakrishnan"));
    assert!(!recursive.contains("Charlotte Oliveiro"));
}

#[test]
fn test_cycle_is_rejected_and_nothing_saved() {
    let ws = Workspace::new();
    ws.university();
    let before = fs::read_to_string(&ws.data_file).unwrap();

    ws.trl()
        .args(["tag", "link", "ma1101r", "computing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cyclic dependency"));

    assert_eq!(fs::read_to_string(&ws.data_file).unwrap(), before);
}

#[test]
fn test_descendants_and_supertags() {
    let ws = Workspace::new();
    ws.university();

    let descendants = ws.run(&["tag", "descendants", "science"]);
    assert_eq!(descendants.trim(), "Tags under 'science': cs1231s, ma1101r, sciencecomp");

    let supers = ws.run(&["tag", "supertags"]);
    assert_eq!(supers.trim(), "Super-tags: computing, nus, science, sciencecomp");
}

#[test]
fn test_unlink_wildcard() {
    let ws = Workspace::new();
    ws.university();

    ws.trl()
        .args(["tag", "unlink", "sciencecomp", "*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unlinked from 'sciencecomp': cs1231s, ma1101r"));

    let recursive = ws.run(&["tag", "members", "nus", "--recursive"]);
    assert!(!recursive.contains("Irfan Ibrahim"));
}

// ============================================================================
// Tag deletion
// ============================================================================

#[test]
fn test_delete_reconnects_children() {
    let ws = Workspace::new();
    ws.university();

    ws.trl()
        .args(["tag", "delete", "sciencecomp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reconnected:"));

    let children = ws.run(&["tag", "children", "computing"]);
    assert_eq!(children.trim(), "Sub-tags of 'computing': cs1231s, ma1101r");
    let recursive = ws.run(&["contact", "list", "-t", "nus", "-r"]);
    assert!(recursive.contains("Irfan Ibrahim"));
}

#[test]
fn test_delete_recursive_keeps_contacts() {
    let ws = Workspace::new();
    ws.university();

    ws.run(&["tag", "delete", "computing", "--recursive"]);

    let listing = ws.run(&["contact", "list"]);
    assert!(listing.contains("Irfan Ibrahim"));
    assert!(listing.contains("3 contact(s) listed."));
    ws.trl()
        .args(["tag", "children", "sciencecomp"])
        .assert()
        .failure();
    let children = ws.run(&["tag", "children", "nus"]);
    assert_eq!(children.trim(), "Sub-tags of 'nus': science");
}

#[test]
fn test_delete_with_contacts() {
    let ws = Workspace::new();
    ws.university();

    ws.trl()
        .args(["tag", "delete", "classmates", "--with-contacts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 contact(s)"));

    let listing = ws.run(&["contact", "list"]);
    assert!(listing.contains("Roy Balakrishnan"));
    assert!(listing.contains("1 contact(s) listed."));
}

#[test]
fn test_delete_recursive_with_contacts() {
    let ws = Workspace::new();
    ws.university();

    ws.run(&["tag", "delete", "science", "-r", "--with-contacts"]);

    let listing = ws.run(&["contact", "list"]);
    assert!(listing.contains("Charlotte Oliveiro"));
    assert!(listing.contains("1 contact(s) listed."));
    let children = ws.run(&["tag", "children", "nus"]);
    assert_eq!(children.trim(), "Sub-tags of 'nus': computing");
}

#[test]
fn test_delete_unknown_tag_fails() {
    let ws = Workspace::new();

    ws.trl()
        .args(["tag", "delete", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tag 'ghost' does not exist"));
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_invalid_config_is_reported() {
    let ws = Workspace::new();
    fs::write(&ws.config, "[logging]\nlevel = \"loud\"\n").unwrap();

    ws.trl()
        .args(["tag", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("logging.level"));
}

#[test]
fn test_corrupt_data_file_is_reported() {
    let ws = Workspace::new();
    fs::write(&ws.data_file, "{ not json").unwrap();

    ws.trl().args(["tag", "list"]).assert().failure();
}
