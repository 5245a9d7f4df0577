//! Keypair lifecycle for one trust domain.
//!
//! A trust domain (developer machine, deployment target, CI runner) holds one
//! x25519 keypair in a key file using the age-keygen layout: comment lines
//! carrying the creation time and the public key, then the secret key line.
//! The embedded `# public key:` comment is what makes the public identifier
//! discoverable without decrypting anything.
//!
//! Private key material is resolved in a fixed order: an already-loaded
//! in-memory identity, a raw key injected through `SATCHEL_AGE_KEY`, then the
//! key file on disk. Failure reports every source checked.

use std::fs;
use std::path::{Path, PathBuf};

use age::x25519;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::{KeyError, Result};

/// Prefix of the comment line embedding the public identifier.
const PUBLIC_KEY_COMMENT: &str = "# public key: ";

/// Prefix of the secret key line.
const SECRET_KEY_PREFIX: &str = "AGE-SECRET-KEY-";

/// Key storage and discovery for the local trust domain.
pub struct KeyStore {
    key_file: PathBuf,
    inline_key: Option<Zeroizing<String>>,
    cached: Option<x25519::Identity>,
}

impl KeyStore {
    pub fn new(key_file: PathBuf, inline_key: Option<String>) -> Self {
        Self {
            key_file,
            inline_key: inline_key.map(Zeroizing::new),
            cached: None,
        }
    }

    /// Build from the documented environment overrides.
    ///
    /// `SATCHEL_AGE_KEY` supplies raw key material (CI injection);
    /// `SATCHEL_AGE_KEY_FILE` overrides the key file path. These are the only
    /// ambient reads this module performs.
    pub fn from_env() -> Self {
        let key_file = std::env::var(constants::ENV_KEY_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_key_file());
        let inline_key = std::env::var(constants::ENV_KEY)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self::new(key_file, inline_key)
    }

    /// Conventional key file path (`~/.satchel/identity.key`).
    pub fn default_key_file() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(constants::KEY_DIR)
            .join(constants::KEY_FILE)
    }

    pub fn key_file(&self) -> &Path {
        &self.key_file
    }

    /// Ensure a keypair exists at the key file path and return its public
    /// identifier.
    ///
    /// If the file exists, the identifier is parsed from the embedded
    /// `# public key:` comment; a key file without one is corrupt. If absent,
    /// a fresh keypair is generated with 0600 permissions. Idempotent.
    pub fn ensure_keypair(&mut self) -> Result<String> {
        if self.key_file.exists() {
            return self.parse_public_id();
        }
        self.generate()
    }

    /// Public identifier of the on-disk keypair.
    pub fn parse_public_id(&self) -> Result<String> {
        let contents = fs::read_to_string(&self.key_file).map_err(KeyError::ReadFailed)?;

        contents
            .lines()
            .find_map(|line| line.strip_prefix(PUBLIC_KEY_COMMENT))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| KeyError::Corrupt(self.key_file.display().to_string()).into())
    }

    /// Generate a new keypair and write the key file.
    fn generate(&mut self) -> Result<String> {
        debug!(path = %self.key_file.display(), "generating keypair");

        let identity = x25519::Identity::generate();
        let public_key = identity.to_public().to_string();

        if let Some(dir) = self.key_file.parent() {
            fs::create_dir_all(dir).map_err(KeyError::WriteFailed)?;
        }

        use age::secrecy::ExposeSecret;
        let secret_str = identity.to_string();
        let contents = format!(
            "# created: {}\n{}{}\n{}\n",
            chrono::Local::now().to_rfc3339(),
            PUBLIC_KEY_COMMENT,
            public_key,
            secret_str.expose_secret(),
        );
        fs::write(&self.key_file, contents).map_err(KeyError::WriteFailed)?;

        // The private key must never be group/world readable.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.key_file, fs::Permissions::from_mode(0o600))
                .map_err(KeyError::WriteFailed)?;
        }

        debug!(path = %self.key_file.display(), "keypair written");

        self.cached = Some(identity);
        Ok(public_key)
    }

    /// Load the active private key.
    ///
    /// Order: in-memory cache, raw injected key, on-disk key file. Fails with
    /// `NoKeyAvailable` naming every source checked.
    pub fn identity(&mut self) -> Result<&x25519::Identity> {
        if self.cached.is_some() {
            return Ok(self.cached.as_ref().unwrap());
        }

        let mut checked = Vec::new();

        if let Some(raw) = self.inline_key.take() {
            let identity = parse_secret_key(&raw)?;
            self.cached = Some(identity);
            return Ok(self.cached.as_ref().unwrap());
        }
        checked.push(format!("${} (unset)", constants::ENV_KEY));

        if self.key_file.exists() {
            #[cfg(unix)]
            self.warn_on_loose_permissions();

            let contents = Zeroizing::new(
                fs::read_to_string(&self.key_file).map_err(KeyError::ReadFailed)?,
            );
            let identity = parse_secret_key(&contents)?;
            debug!(path = %self.key_file.display(), "identity loaded");
            self.cached = Some(identity);
            return Ok(self.cached.as_ref().unwrap());
        }
        checked.push(self.key_file.display().to_string());

        Err(KeyError::NoKeyAvailable {
            checked: checked.join(", "),
        }
        .into())
    }

    #[cfg(unix)]
    fn warn_on_loose_permissions(&self) {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(metadata) = fs::metadata(&self.key_file) {
            let mode = metadata.permissions().mode() & 0o777;
            if mode != 0o600 {
                tracing::warn!(
                    "insecure key file permissions {:o}; run: chmod 600 {}",
                    mode,
                    self.key_file.display()
                );
            }
        }
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("key_file", &self.key_file)
            .field("inline_key", &self.inline_key.is_some())
            .field("cached", &self.cached.is_some())
            .finish()
    }
}

/// Extract and parse the `AGE-SECRET-KEY-` line from raw key material.
///
/// Accepts either a bare secret key or full key file contents with comments.
fn parse_secret_key(raw: &str) -> Result<x25519::Identity> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with(SECRET_KEY_PREFIX))
        .ok_or_else(|| KeyError::InvalidFormat("no AGE-SECRET-KEY line found".to_string()))?;

    line.parse::<x25519::Identity>()
        .map_err(|e: &str| KeyError::InvalidFormat(e.to_string()).into())
}
