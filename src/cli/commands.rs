//! Command implementations.
//!
//! Each handler opens the store rooted in the working directory with the
//! environment-configured keystore, performs one operation, and prints its
//! result. Values go to stdout; confirmations and hints are quiet-aware.

use crate::cli::output;
use crate::core::constants;
use crate::core::keystore::KeyStore;
use crate::core::policy::AddOutcome;
use crate::core::resolver::{ConfigResolver, ProcessEnv, TerminalPrompt};
use crate::core::store::SecretStore;
use crate::error::Result;

/// Store rooted in the current directory.
fn open_store() -> Result<SecretStore> {
    let dir = std::env::current_dir()?;
    Ok(SecretStore::in_dir(&dir, KeyStore::from_env()))
}

/// Bootstrap keypair, policy, and document. Idempotent.
pub fn init() -> Result<()> {
    let mut store = open_store()?;

    let public_id = store.keystore_mut().ensure_keypair()?;
    let key_path = store.keystore_mut().key_file().to_path_buf();
    store.ensure_document()?;

    output::success("satchel initialized");
    output::kv("recipient:", &public_id);
    output::kv(
        "policy:",
        format!("{} (commit this)", constants::POLICY_FILE),
    );
    output::kv(
        "document:",
        format!("{} (commit this)", constants::DOCUMENT_FILE),
    );
    output::kv(
        "key:",
        format!("{} (keep out of version control)", key_path.display()),
    );
    output::hint("next: satchel set KEY VALUE");
    Ok(())
}

/// Print one decrypted value.
pub fn get(key: &str) -> Result<()> {
    let mut store = open_store()?;
    let value = store.get(key)?;
    println!("{}", value.as_str());
    Ok(())
}

/// Encrypt and store one value.
pub fn set(key: &str, value: &str) -> Result<()> {
    let mut store = open_store()?;
    store.set(key, value)?;
    output::success(&format!("set: {key}"));
    Ok(())
}

/// Remove one value.
pub fn delete(key: &str) -> Result<()> {
    let mut store = open_store()?;
    store.delete(key)?;
    output::success(&format!("removed: {key}"));
    Ok(())
}

/// Print sorted key names, one per line. Empty store prints nothing.
pub fn list(json: bool) -> Result<()> {
    let mut store = open_store()?;
    let keys = store.list()?;

    if json {
        println!("{}", serde_json::to_string(&keys).unwrap_or_default());
        return Ok(());
    }
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

/// Print the full decrypted mapping in its native TOML form (or JSON).
pub fn dump(json: bool) -> Result<()> {
    let mut store = open_store()?;
    let doc = store.dump()?;

    if json {
        println!("{}", doc.to_json());
    } else {
        print!("{}", doc.to_toml()?);
    }
    Ok(())
}

/// Edit the decrypted document interactively.
pub fn edit() -> Result<()> {
    let mut store = open_store()?;
    let entries = store.edit()?;
    output::success(&format!("edited: {entries} entries re-encrypted"));
    Ok(())
}

/// Grow the recipient set and re-encrypt the document for it.
pub fn add_recipient(public_key: &str) -> Result<()> {
    let mut store = open_store()?;

    match store.add_recipient(public_key)? {
        AddOutcome::Added => {
            let total = store.registry().load()?.recipients.len();
            output::success(&format!("recipient added ({total} total)"));
            if store.document_path().exists() {
                output::dimmed("document re-encrypted for the new recipient set");
            }
        }
        AddOutcome::AlreadyPresent => {
            output::success("recipient already present; nothing to do");
        }
    }
    Ok(())
}

/// Resolve a value through the priority chain and print it.
pub fn resolve(
    name: &str,
    prompt: Option<String>,
    require: Option<String>,
    fallback: Option<String>,
) -> Result<()> {
    let mut store = open_store()?;
    let prompt = prompt.unwrap_or_else(|| format!("Enter value for {name}"));
    let require = require.unwrap_or_default();

    let mut resolver = ConfigResolver::new(&mut store, ProcessEnv, TerminalPrompt);
    let resolved = resolver.resolve(name, &prompt, &require, fallback.as_deref())?;

    tracing::debug!(name, source = %resolved.source, "resolved");
    println!("{}", resolved.value);
    Ok(())
}
