//! The decrypted secret document.
//!
//! Logically a flat `string -> string` mapping. The on-disk plaintext (what
//! gets encrypted) is TOML, which round-trips arbitrary unicode values
//! including embedded newlines. Keys are restricted to environment-variable
//! names because every entry can also be overridden through the process
//! environment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// The full key/value mapping held by the encrypted document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    entries: BTreeMap<String, String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the TOML plaintext form.
    pub fn from_toml(text: &str) -> Result<Self> {
        let entries: BTreeMap<String, String> =
            toml::from_str(text).map_err(StoreError::MalformedDocument)?;
        Ok(Self { entries })
    }

    /// Serialize to the TOML plaintext form.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(&self.entries)
            .map_err(|e| StoreError::EncryptionFailed(format!("serialize: {e}")).into())
    }

    /// Serialize the mapping as pretty JSON (for `dump --json`).
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.entries).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Remove an entry; `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// All key names in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge an edited document into this one.
    ///
    /// Edited keys overwrite, keys absent from the edited form are preserved.
    /// This is a merge rather than a replace so a partial edit never drops
    /// entries the editor session did not touch.
    pub fn merge(&mut self, edited: Document) {
        for (key, value) in edited.entries {
            self.entries.insert(key, value);
        }
    }
}

/// Validate a document key name.
///
/// Keys double as environment variable names: A-Z, a-z, 0-9, underscore,
/// not starting with a digit, non-empty.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKeyName {
            key: key.to_string(),
            reason: "empty".to_string(),
        }
        .into());
    }

    if key.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(StoreError::InvalidKeyName {
            key: key.to_string(),
            reason: "cannot start with a digit".to_string(),
        }
        .into());
    }

    for (i, ch) in key.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(StoreError::InvalidKeyName {
                key: key.to_string(),
                reason: format!("invalid character '{}' at position {}", ch, i + 1),
            }
            .into());
        }
    }

    Ok(())
}
