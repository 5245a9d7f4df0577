//! Shared test harness.
//!
//! Each test gets an isolated HOME (for the key file) and an isolated
//! project directory (for the policy and document files).

#![allow(dead_code)]

use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

/// A valid age public key for recipient tests where the private half is
/// never needed.
pub const ORPHAN_PUBLIC_KEY: &str =
    "age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p";

/// An invalid public key for negative tests.
pub const INVALID_PUBLIC_KEY: &str = "not-a-valid-age-key";

pub struct Test {
    pub home: TempDir,
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("temp home"),
            dir: TempDir::new().expect("temp project dir"),
        }
    }

    /// A satchel command with an isolated environment.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("satchel").expect("satchel binary");
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME
        cmd.env("USERPROFILE", self.home.path());
        cmd.env_remove("SATCHEL_AGE_KEY");
        cmd.env_remove("SATCHEL_AGE_KEY_FILE");
        cmd.env_remove("SATCHEL_NESTED");
        cmd.current_dir(self.dir.path());
        cmd
    }

    pub fn init(&self) -> Output {
        self.cmd().arg("init").output().expect("satchel init")
    }

    pub fn set(&self, key: &str, value: &str) -> Output {
        self.cmd()
            .args(["set", key, value])
            .output()
            .expect("satchel set")
    }

    pub fn get(&self, key: &str) -> Output {
        self.cmd().args(["get", key]).output().expect("satchel get")
    }

    pub fn delete(&self, key: &str) -> Output {
        self.cmd()
            .args(["delete", key])
            .output()
            .expect("satchel delete")
    }

    pub fn list(&self) -> Output {
        self.cmd().arg("list").output().expect("satchel list")
    }

    pub fn dump(&self) -> Output {
        self.cmd().arg("dump").output().expect("satchel dump")
    }

    pub fn add_recipient(&self, public_key: &str) -> Output {
        self.cmd()
            .args(["add-recipient", public_key])
            .output()
            .expect("satchel add-recipient")
    }

    /// Generate a standalone keypair (another trust domain) and return
    /// `(public_id, private_key_line)`.
    pub fn foreign_keypair(&self) -> (String, String) {
        let key_file = self.home.path().join("foreign.key");
        let mut keystore = satchel::core::keystore::KeyStore::new(key_file.clone(), None);
        let public_id = keystore.ensure_keypair().expect("generate keypair");

        let contents = std::fs::read_to_string(&key_file).expect("read key file");
        let secret = contents
            .lines()
            .find(|l| l.starts_with("AGE-SECRET-KEY-"))
            .expect("secret key line")
            .to_string();
        (public_id, secret)
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
