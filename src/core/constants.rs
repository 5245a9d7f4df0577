//! Constants used throughout satchel.
//!
//! Centralizes file names and environment variable names.

/// Encrypted document file name, relative to the working directory.
pub const DOCUMENT_FILE: &str = "satchel.secrets.age";

/// Recipient policy file name, relative to the working directory.
pub const POLICY_FILE: &str = ".satchel.toml";

/// Key directory relative to HOME (~/.satchel).
pub const KEY_DIR: &str = ".satchel";

/// Private key file name inside the key directory.
pub const KEY_FILE: &str = "identity.key";

/// Raw private key injected via environment (CI).
pub const ENV_KEY: &str = "SATCHEL_AGE_KEY";

/// Override for the private key file path.
pub const ENV_KEY_FILE: &str = "SATCHEL_AGE_KEY_FILE";

/// Marker set on child processes so nested invocations run quiet.
pub const ENV_NESTED: &str = "SATCHEL_NESTED";

/// Tracing filter environment variable.
pub const ENV_LOG: &str = "SATCHEL_LOG";
