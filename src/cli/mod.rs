//! Command-line interface.

pub mod commands;
pub mod completions;
pub mod output;

use clap::{Parser, Subcommand};

/// Satchel - encrypted configuration for provisioning pipelines.
#[derive(Parser)]
#[command(
    name = "satchel",
    about = "Encrypted, multi-recipient configuration store",
    version
)]
pub struct Cli {
    /// Suppress progress and confirmation output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Bootstrap keypair, recipient policy, and an empty document
    Init,

    /// Print a decrypted value
    Get {
        /// Secret key (e.g. SMTP_PASSWORD)
        key: String,
    },

    /// Store an encrypted value
    Set {
        /// Secret key
        key: String,
        /// Plaintext value
        value: String,
    },

    /// Remove a value
    #[command(visible_alias = "unset")]
    Delete {
        /// Secret key
        key: String,
    },

    /// List all key names, sorted
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the entire decrypted mapping
    Dump {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Edit the decrypted document in $EDITOR
    Edit,

    /// Permit another public key to decrypt the document
    AddRecipient {
        /// age public key (age1...)
        public_key: String,
    },

    /// Resolve a configuration value: environment, store, prompt, default
    Resolve {
        /// Variable name
        name: String,
        /// Prompt text shown when the value must be asked for
        #[arg(long)]
        prompt: Option<String>,
        /// Mark the value required; shown when no source can supply it
        #[arg(long)]
        require: Option<String>,
        /// Fallback value used before prompting
        #[arg(long = "default")]
        fallback: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: completions::Shell,
    },
}

/// Execute a parsed command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init => commands::init(),
        Get { key } => commands::get(&key),
        Set { key, value } => commands::set(&key, &value),
        Delete { key } => commands::delete(&key),
        List { json } => commands::list(json),
        Dump { json } => commands::dump(json),
        Edit => commands::edit(),
        AddRecipient { public_key } => commands::add_recipient(&public_key),
        Resolve {
            name,
            prompt,
            require,
            fallback,
        } => commands::resolve(&name, prompt, require, fallback),
        Completions { shell } => completions::execute(shell),
    }
}
