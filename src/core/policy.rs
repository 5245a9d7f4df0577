//! Recipient policy file management.
//!
//! The policy file (`.satchel.toml`) declares the ordered set of public keys
//! the encrypted document must stay decryptable by, plus a path rule naming
//! the document it governs. Membership only grows through [`RecipientRegistry::add`];
//! there is no revoke operation, an operator edits the file out-of-band.
//!
//! The registry never touches ciphertext. After a successful `add` the store
//! must re-encrypt, which `SecretStore::add_recipient` enforces.

use std::fs;
use std::path::{Path, PathBuf};

use age::x25519;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::core::crypto;
use crate::error::{PolicyError, Result};

/// On-disk policy document.
#[derive(Debug, Serialize, Deserialize)]
pub struct Policy {
    /// Document file name this policy governs.
    pub path_match: String,
    /// Ordered, duplicate-free recipient public keys.
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl Policy {
    fn new(initial: Option<&str>) -> Self {
        Self {
            path_match: constants::DOCUMENT_FILE.to_string(),
            recipients: initial.map(|id| vec![id.to_string()]).unwrap_or_default(),
        }
    }
}

/// Outcome of a recipient addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Not an error; adding an existing recipient is a no-op success.
    AlreadyPresent,
}

/// Append-only view over the policy file.
#[derive(Debug)]
pub struct RecipientRegistry {
    path: PathBuf,
}

impl RecipientRegistry {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the policy file if missing; no-op if it already exists.
    pub fn ensure(&self, initial: Option<&str>) -> Result<()> {
        if self.exists() {
            return Ok(());
        }

        if let Some(id) = initial {
            crypto::parse_recipient(id)?;
        }

        debug!(path = %self.path.display(), "creating recipient policy");
        self.save(&Policy::new(initial))
    }

    /// Load the policy; the file must exist.
    pub fn load(&self) -> Result<Policy> {
        if !self.exists() {
            return Err(PolicyError::Missing(self.path.display().to_string()).into());
        }
        let contents = fs::read_to_string(&self.path)?;
        let policy: Policy = toml::from_str(&contents).map_err(PolicyError::Parse)?;
        Ok(policy)
    }

    /// Append a recipient if not already present.
    ///
    /// Validates the key format first, so a typo never lands in the policy.
    pub fn add(&self, id: &str) -> Result<AddOutcome> {
        crypto::parse_recipient(id)?;

        let mut policy = self.load()?;
        if policy.recipients.iter().any(|r| r == id) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        policy.recipients.push(id.to_string());
        self.save(&policy)?;
        debug!(recipient = id, "recipient added to policy");
        Ok(AddOutcome::Added)
    }

    /// All recipients parsed into age keys; errors if the policy is empty.
    pub fn recipients(&self) -> Result<Vec<x25519::Recipient>> {
        let policy = self.load()?;
        if policy.recipients.is_empty() {
            return Err(PolicyError::NoRecipients.into());
        }
        policy
            .recipients
            .iter()
            .map(|id| crypto::parse_recipient(id))
            .collect()
    }

    fn save(&self, policy: &Policy) -> Result<()> {
        let contents = toml::to_string_pretty(policy).map_err(PolicyError::Serialize)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
