//! The encrypted secret store.
//!
//! The only place that touches the document's ciphertext. Every mutating
//! operation decrypts the full document, applies the change in memory,
//! re-encrypts for the *current* recipient set, and atomically replaces the
//! file (write to temp path, rename over the original). A failed encrypt or
//! decrypt therefore never damages the on-disk document.
//!
//! Cross-domain write races are resolved last-writer-wins: the previous
//! ciphertext is kept as a `.bak` sibling so a clobbered change is
//! recoverable. There is no inter-process locking.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::constants;
use crate::core::context::InvocationContext;
use crate::core::crypto;
use crate::core::document::Document;
use crate::core::keystore::KeyStore;
use crate::core::policy::{AddOutcome, RecipientRegistry};
use crate::error::{Result, StoreError};

/// Owns the encrypted document and its collaborators.
#[derive(Debug)]
pub struct SecretStore {
    document_path: PathBuf,
    registry: RecipientRegistry,
    keystore: KeyStore,
}

impl SecretStore {
    pub fn new(document_path: PathBuf, registry: RecipientRegistry, keystore: KeyStore) -> Self {
        Self {
            document_path,
            registry,
            keystore,
        }
    }

    /// Store rooted in `dir` using the conventional file names.
    pub fn in_dir(dir: &Path, keystore: KeyStore) -> Self {
        Self::new(
            dir.join(constants::DOCUMENT_FILE),
            RecipientRegistry::new(dir.join(constants::POLICY_FILE)),
            keystore,
        )
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn registry(&self) -> &RecipientRegistry {
        &self.registry
    }

    pub fn keystore_mut(&mut self) -> &mut KeyStore {
        &mut self.keystore
    }

    /// Bootstrap the document if missing: keypair first, then policy, then an
    /// empty mapping encrypted for the current recipient set. Idempotent.
    pub fn ensure_document(&mut self) -> Result<()> {
        if self.document_path.exists() {
            return Ok(());
        }

        let public_id = self.keystore.ensure_keypair()?;
        self.registry.ensure(Some(&public_id))?;

        debug!(path = %self.document_path.display(), "creating empty document");
        self.persist(&Document::new())
    }

    /// Get a single decrypted value.
    pub fn get(&mut self, key: &str) -> Result<Zeroizing<String>> {
        let doc = self.load()?;
        doc.get(key)
            .map(|v| Zeroizing::new(v.to_string()))
            .ok_or_else(|| StoreError::NotFound(key.to_string()).into())
    }

    /// Get a value, treating an absent document or key as `None`.
    ///
    /// Used by the resolver, where "not in the store" is an ordinary
    /// fall-through rather than an error.
    pub fn try_get(&mut self, key: &str) -> Result<Option<String>> {
        let doc = self.load()?;
        Ok(doc.get(key).map(str::to_string))
    }

    /// Upsert a value and rewrite the document.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_document()?;
        let mut doc = self.load()?;
        doc.insert(key, value)?;
        self.persist(&doc)
    }

    /// Remove a key and rewrite the document.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let mut doc = self.load()?;
        if !doc.remove(key) {
            return Err(StoreError::NotFound(key.to_string()).into());
        }
        self.persist(&doc)
    }

    /// All key names, sorted; empty if the document is absent.
    pub fn list(&mut self) -> Result<Vec<String>> {
        Ok(self.load()?.keys())
    }

    /// The entire decrypted mapping; empty if the document is absent.
    pub fn dump(&mut self) -> Result<Document> {
        self.load()
    }

    /// Open an interactive editing session on the decrypted document.
    ///
    /// The plaintext goes to a 0600 scratch file, the editor runs on it, and
    /// the result is merged back: edited keys overwrite, untouched keys are
    /// preserved. Returns the entry count after the merge.
    pub fn edit(&mut self) -> Result<usize> {
        if !atty::is(atty::Stream::Stdin) {
            return Err(
                StoreError::EditorUnavailable("non-interactive session".to_string()).into(),
            );
        }
        let editor = select_editor()?;

        self.ensure_document()?;
        let mut doc = self.load()?;

        let scratch = std::env::temp_dir().join(format!("satchel-edit-{}.toml", std::process::id()));
        write_scratch(&scratch, doc.to_toml()?.as_bytes())?;

        let mut cmd = std::process::Command::new(&editor);
        cmd.arg(&scratch);
        InvocationContext::mark_nested(&mut cmd);
        let status = cmd.status();

        let edited_text = fs::read_to_string(&scratch);
        let _ = fs::remove_file(&scratch);

        let status = status.map_err(|e| StoreError::EditorUnavailable(e.to_string()))?;
        if !status.success() {
            return Err(StoreError::EditorUnavailable(format!(
                "{editor} exited with {status}"
            ))
            .into());
        }

        let edited = Document::from_toml(&edited_text?)?;
        doc.merge(edited);
        self.persist(&doc)?;
        Ok(doc.len())
    }

    /// Add a recipient and, when a document exists, immediately re-encrypt it
    /// for the grown set. The re-encrypt is a postcondition, not best effort:
    /// the new recipient can decrypt the document as soon as this returns.
    pub fn add_recipient(&mut self, id: &str) -> Result<AddOutcome> {
        let outcome = self.registry.add(id)?;
        if outcome == AddOutcome::Added && self.document_path.exists() {
            self.reencrypt_for_current_recipients()?;
            debug!(recipient = id, "document re-encrypted for new recipient");
        }
        Ok(outcome)
    }

    /// Decrypt with the working key and re-encrypt for the full recipient set.
    pub fn reencrypt_for_current_recipients(&mut self) -> Result<()> {
        let doc = self.load()?;
        self.persist(&doc)
    }

    /// Decrypt the document, or produce an empty mapping.
    ///
    /// Absent file: empty. File without age metadata: empty with a warning
    /// (`DocumentNotEncrypted` is recoverable, it marks a store that was
    /// never bootstrapped properly). Age data that will not open with the
    /// available key is fatal.
    fn load(&mut self) -> Result<Document> {
        if !self.document_path.exists() {
            return Ok(Document::new());
        }

        let data = fs::read(&self.document_path)?;
        if !crypto::is_age_encrypted(&data) {
            let reason = StoreError::NotEncrypted(self.document_path.display().to_string());
            warn!("{reason}; treating as empty store");
            return Ok(Document::new());
        }

        let identity = self.keystore.identity()?;
        let plaintext = Zeroizing::new(crypto::decrypt(&data, identity)?);
        Document::from_toml(&plaintext)
    }

    /// Encrypt for the current recipients and atomically replace the file.
    fn persist(&mut self, doc: &Document) -> Result<()> {
        let recipients = self.registry.recipients()?;
        let plaintext = Zeroizing::new(doc.to_toml()?);
        let ciphertext = crypto::encrypt(&plaintext, &recipients)?;

        write_atomic(&self.document_path, ciphertext.as_bytes())?;
        debug!(entries = doc.len(), "document rewritten");
        Ok(())
    }
}

/// Create the plaintext scratch file owner-only before any secret lands in
/// it. `create_new` refuses a pre-existing path, including a planted symlink,
/// so the plaintext is never readable by another user at any point.
fn write_scratch(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)
}

/// Write via temp file + rename, keeping the previous contents as `.bak`.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    fs::write(&tmp, contents)?;
    if path.exists() {
        fs::copy(path, path.with_file_name(format!("{file_name}.bak")))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Pick the editor from `$VISUAL`/`$EDITOR` (default `vi`) and confirm it is
/// on PATH before blocking on it.
fn select_editor() -> Result<String> {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    which::which(&editor)
        .map_err(|_| StoreError::EditorUnavailable(editor.clone()))?;
    Ok(editor)
}
