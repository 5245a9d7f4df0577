//! Error types for satchel.
//!
//! Errors are grouped per concern: keys, recipient policy, the encrypted
//! store, and value resolution. Everything converges on [`Error`] so the CLI
//! can match on specific failures and attach hints.

use std::io;

use thiserror::Error;

/// Failures around the local keypair.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("keypair file {0} exists but contains no `# public key:` line")]
    Corrupt(String),

    #[error("no private key available (checked: {checked})")]
    NoKeyAvailable { checked: String },

    #[error("invalid private key: {0}")]
    InvalidFormat(String),

    #[error("failed to read key file: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("failed to write key file: {0}")]
    WriteFailed(#[source] io::Error),
}

/// Failures around the recipient policy file.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("recipient policy not found at {0}")]
    Missing(String),

    #[error("invalid recipient public key: {0}")]
    InvalidRecipient(String),

    #[error("policy lists no recipients")]
    NoRecipients,

    #[error("policy parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("policy serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Failures around the encrypted document.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("document {0} carries no age encryption metadata")]
    NotEncrypted(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("document is not a flat string-to-string mapping: {0}")]
    MalformedDocument(#[from] toml::de::Error),

    #[error("editor unavailable: {0}")]
    EditorUnavailable(String),

    #[error("invalid key name '{key}': {reason}")]
    InvalidKeyName { key: String, reason: String },
}

/// Failures while resolving a configuration value.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{message}: required value '{name}' has no source in non-interactive mode")]
    RequiredMissing { name: String, message: String },

    #[error("{message}: required value '{name}' was left empty")]
    RequiredEmpty { name: String, message: String },

    #[error("prompt failed: {0}")]
    PromptFailed(#[source] io::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_failing_check() {
        let err: Error = StoreError::NotFound("API_KEY".to_string()).into();
        assert!(err.to_string().contains("not found"));

        let err: Error = StoreError::DecryptionFailed("no matching key".to_string()).into();
        assert!(err.to_string().contains("decryption failed"));

        let err: Error = KeyError::Corrupt("/keys/identity.key".to_string()).into();
        assert!(err.to_string().contains("no `# public key:` line"));

        let err: Error = PolicyError::InvalidRecipient("garbage".to_string()).into();
        assert!(err.to_string().contains("invalid recipient"));
    }

    #[test]
    fn required_missing_names_both_conditions() {
        let err: Error = ResolveError::RequiredMissing {
            name: "Z".to_string(),
            message: "Z is required".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("Z is required"));
        assert!(msg.contains("required"));
        assert!(msg.contains("non-interactive"));
    }

    #[test]
    fn no_key_available_reports_checked_sources() {
        let err: Error = KeyError::NoKeyAvailable {
            checked: "$SATCHEL_AGE_KEY (unset), /home/x/.satchel/identity.key".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("SATCHEL_AGE_KEY"));
        assert!(msg.contains("identity.key"));
    }

    #[test]
    fn io_errors_convert_into_the_top_level_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
