//! age encryption of the secret document.
//!
//! Thin wrapper over the age crate: armor-encode for a recipient set,
//! decrypt with one identity, and sniff whether a blob is age data at all.
//! The distinction between "not age data" and "age data we cannot open"
//! drives the recoverable/fatal split in the store.

use std::io::{Read, Write};

use age::x25519;

use crate::error::{Result, StoreError};

/// ASCII armor header emitted by age.
const ARMOR_BEGIN: &str = "-----BEGIN AGE ENCRYPTED FILE-----";

/// Magic line of the binary age format.
const BINARY_MAGIC: &[u8] = b"age-encryption.org/v1";

/// Encrypt a plaintext document for every recipient in the set.
///
/// Returns the ASCII-armored ciphertext; any listed recipient's private key
/// can open it.
pub fn encrypt(plaintext: &str, recipients: &[x25519::Recipient]) -> Result<String> {
    let encryptor =
        age::Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn age::Recipient))
            .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;

    let mut ciphertext = Vec::new();
    let mut writer = encryptor
        .wrap_output(
            age::armor::ArmoredWriter::wrap_output(
                &mut ciphertext,
                age::armor::Format::AsciiArmor,
            )
            .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?,
        )
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;

    writer
        .write_all(plaintext.as_bytes())
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;
    let armored = writer
        .finish()
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;
    armored
        .finish()
        .map_err(|e| StoreError::EncryptionFailed(e.to_string()))?;

    String::from_utf8(ciphertext)
        .map_err(|e| StoreError::EncryptionFailed(format!("UTF-8 error: {e}")).into())
}

/// Decrypt an age document with a single private identity.
pub fn decrypt(ciphertext: &[u8], identity: &x25519::Identity) -> Result<String> {
    let reader = age::armor::ArmoredReader::new(ciphertext);
    let decryptor = age::Decryptor::new(reader)
        .map_err(|e| StoreError::DecryptionFailed(e.to_string()))?;

    let mut plaintext = Vec::new();
    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .map_err(|e| StoreError::DecryptionFailed(e.to_string()))?;
    reader
        .read_to_end(&mut plaintext)
        .map_err(|e| StoreError::DecryptionFailed(e.to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|e| StoreError::DecryptionFailed(format!("UTF-8 error: {e}")).into())
}

/// Whether the blob carries age encryption metadata (armored or binary).
///
/// A file without this marker is `DocumentNotEncrypted` territory: treated
/// as an empty store rather than a decryption failure.
pub fn is_age_encrypted(data: &[u8]) -> bool {
    if data.starts_with(BINARY_MAGIC) {
        return true;
    }
    match std::str::from_utf8(data) {
        Ok(text) => text.trim_start().starts_with(ARMOR_BEGIN),
        Err(_) => false,
    }
}

/// Parse a public key string into an age recipient.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| crate::error::PolicyError::InvalidRecipient(key.to_string()).into())
}
