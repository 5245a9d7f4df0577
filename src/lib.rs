//! Satchel - an encrypted, multi-recipient configuration store.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── mod           # Argument parsing and dispatch
//! │   ├── commands      # One handler per subcommand
//! │   ├── completions   # Shell completions
//! │   └── output        # Terminal output helpers (quiet-aware)
//! └── core/             # Core library components
//!     ├── keystore      # Per-trust-domain keypair lifecycle
//!     ├── policy        # Recipient policy file (append-only)
//!     ├── document      # Decrypted key/value mapping
//!     ├── crypto        # age encrypt/decrypt of the document
//!     ├── store         # Encrypted document CRUD, atomic rewrite
//!     ├── resolver      # environment → store → prompt → default chain
//!     └── context       # Quiet-mode detection for nested invocations
//! ```
//!
//! # Features
//!
//! - One age-encrypted document holding all configuration secrets
//! - Multi-recipient trust model: every listed public key can decrypt
//! - Deterministic value resolution with silent write-back of prompted values
//! - Atomic document rewrites with a backup of the previous ciphertext

pub mod cli;
pub mod core;
pub mod error;
