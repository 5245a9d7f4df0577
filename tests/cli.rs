//! End-to-end tests for the satchel CLI.
//!
//! Each test drives the compiled binary against isolated temp directories.

mod support;

use predicates::prelude::*;
use support::{stderr, stdout, Test, INVALID_PUBLIC_KEY, ORPHAN_PUBLIC_KEY};

#[test]
fn init_creates_key_policy_and_document() {
    let t = Test::new();

    t.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));

    assert!(t.dir.path().join(".satchel.toml").exists());
    assert!(t.dir.path().join("satchel.secrets.age").exists());
    assert!(t.home.path().join(".satchel/identity.key").exists());

    let policy = std::fs::read_to_string(t.dir.path().join(".satchel.toml")).unwrap();
    assert!(policy.contains("path_match"));
    assert!(policy.contains("age1"));
}

#[test]
fn init_is_idempotent() {
    let t = Test::new();
    assert!(t.init().status.success());

    let key_before =
        std::fs::read(t.home.path().join(".satchel/identity.key")).unwrap();
    let doc_before = std::fs::read(t.dir.path().join("satchel.secrets.age")).unwrap();

    assert!(t.init().status.success());

    let key_after = std::fs::read(t.home.path().join(".satchel/identity.key")).unwrap();
    let doc_after = std::fs::read(t.dir.path().join("satchel.secrets.age")).unwrap();
    assert_eq!(key_before, key_after, "second init must not rotate the key");
    assert_eq!(doc_before, doc_after, "second init must not reset the document");
}

#[test]
fn set_then_get_roundtrip() {
    let t = Test::new();

    t.cmd()
        .args(["set", "SMTP_PASSWORD", "hunter2 with spaces"])
        .assert()
        .success();

    t.cmd()
        .args(["get", "SMTP_PASSWORD"])
        .assert()
        .success()
        .stdout("hunter2 with spaces\n");
}

#[test]
fn set_bootstraps_without_explicit_init() {
    let t = Test::new();

    // No init: set must bootstrap key, policy, and document on first use.
    assert!(t.set("FIRST", "value").status.success());
    assert!(t.dir.path().join(".satchel.toml").exists());
    assert_eq!(stdout(&t.get("FIRST")), "value\n");
}

#[test]
fn set_overwrites_existing_value() {
    let t = Test::new();

    t.set("DB_URL", "first");
    t.set("DB_URL", "second");
    assert_eq!(stdout(&t.get("DB_URL")), "second\n");
}

#[test]
fn get_missing_key_fails() {
    let t = Test::new();
    t.init();

    t.cmd()
        .args(["get", "NEVER_SET"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn delete_and_unset_alias() {
    let t = Test::new();
    t.set("GONE", "v");

    t.cmd().args(["delete", "GONE"]).assert().success();
    assert!(!t.get("GONE").status.success());

    t.set("GONE2", "v");
    t.cmd().args(["unset", "GONE2"]).assert().success();
    assert!(!t.get("GONE2").status.success());
}

#[test]
fn delete_missing_key_fails() {
    let t = Test::new();
    t.init();

    t.cmd().args(["delete", "NOPE"]).assert().failure();
}

#[test]
fn list_scenario_is_sorted_and_exact() {
    let t = Test::new();

    t.set("K1", "v1");
    t.set("K2", "v2");
    t.set("K3", "v3");
    t.delete("K1");
    t.set("K4", "v4");

    t.cmd().arg("list").assert().success().stdout("K2\nK3\nK4\n");
}

#[test]
fn list_on_absent_store_is_empty() {
    let t = Test::new();

    t.cmd().arg("list").assert().success().stdout("");
}

#[test]
fn dump_prints_full_mapping() {
    let t = Test::new();
    t.set("ALPHA", "1");
    t.set("BETA", "two");

    let out = stdout(&t.dump());
    assert!(out.contains("ALPHA = \"1\""));
    assert!(out.contains("BETA = \"two\""));
}

#[test]
fn dump_json_on_absent_store_is_empty_object() {
    let t = Test::new();

    t.cmd()
        .args(["dump", "--json"])
        .assert()
        .success()
        .stdout("{}\n");
}

#[test]
fn add_recipient_requires_policy() {
    let t = Test::new();

    t.cmd()
        .args(["add-recipient", ORPHAN_PUBLIC_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn add_recipient_rejects_invalid_key() {
    let t = Test::new();
    t.init();

    t.cmd()
        .args(["add-recipient", INVALID_PUBLIC_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid recipient"));
}

#[test]
fn add_recipient_twice_is_noop_success() {
    let t = Test::new();
    t.init();

    t.cmd()
        .args(["add-recipient", ORPHAN_PUBLIC_KEY])
        .assert()
        .success();
    t.cmd()
        .args(["add-recipient", ORPHAN_PUBLIC_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("already present"));
}

#[test]
fn added_recipient_can_decrypt_with_injected_key() {
    let t = Test::new();
    t.set("SHARED", "team value");

    let (public_id, secret_key) = t.foreign_keypair();
    assert!(t.add_recipient(&public_id).status.success());

    // The other trust domain has no key file, only the injected raw key.
    let other_home = tempfile::TempDir::new().unwrap();
    #[allow(deprecated)]
    let mut cmd = assert_cmd::Command::cargo_bin("satchel").unwrap();
    cmd.env("HOME", other_home.path())
        .env("USERPROFILE", other_home.path())
        .env("SATCHEL_AGE_KEY", &secret_key)
        .env_remove("SATCHEL_AGE_KEY_FILE")
        .current_dir(t.dir.path());

    cmd.args(["get", "SHARED"])
        .assert()
        .success()
        .stdout("team value\n");
}

#[test]
fn get_without_any_key_lists_checked_sources() {
    let t = Test::new();
    t.set("X", "v");

    // Fresh home, no injected key: decryption cannot find material.
    let other_home = tempfile::TempDir::new().unwrap();
    #[allow(deprecated)]
    let mut cmd = assert_cmd::Command::cargo_bin("satchel").unwrap();
    cmd.env("HOME", other_home.path())
        .env("USERPROFILE", other_home.path())
        .env_remove("SATCHEL_AGE_KEY")
        .env_remove("SATCHEL_AGE_KEY_FILE")
        .current_dir(t.dir.path());

    let out = cmd.args(["get", "X"]).output().unwrap();
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("SATCHEL_AGE_KEY"));
    assert!(err.contains("identity.key"));
}

#[test]
fn corrupt_key_file_is_fatal() {
    let t = Test::new();
    let key_dir = t.home.path().join(".satchel");
    std::fs::create_dir_all(&key_dir).unwrap();
    std::fs::write(key_dir.join("identity.key"), "garbage, no comment\n").unwrap();

    t.cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("public key"));
}

#[test]
fn unencrypted_document_reads_as_empty() {
    let t = Test::new();
    t.init();
    std::fs::write(t.dir.path().join("satchel.secrets.age"), "K = \"plain\"\n").unwrap();

    // Reads treat it as empty rather than failing.
    t.cmd().arg("list").assert().success().stdout("");
}

#[test]
fn quiet_suppresses_confirmations_not_values() {
    let t = Test::new();

    let out = t.cmd().args(["--quiet", "set", "K", "v"]).output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "");

    t.cmd()
        .args(["--quiet", "get", "K"])
        .assert()
        .success()
        .stdout("v\n");
}

#[test]
fn nested_marker_implies_quiet() {
    let t = Test::new();

    let mut cmd = t.cmd();
    cmd.env("SATCHEL_NESTED", "1");
    let out = cmd.args(["set", "K", "v"]).output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "");
}
