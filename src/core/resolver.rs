//! Layered configuration-value resolution.
//!
//! The single entry point every provisioning script uses to obtain a named
//! value. Sources are tried strictly in order: process environment, encrypted
//! store, supplied default, interactive prompt. A later source is never
//! consulted once an earlier one yields a non-empty value. Values entered at
//! the prompt are persisted back into the store fire-and-forget: resolution
//! succeeds even if persistence fails.
//!
//! Environment access goes through an explicit [`EnvLookup`] object; nothing
//! here reads ambient process state directly.

use std::collections::BTreeMap;
use std::io;

use tracing::{debug, warn};

use crate::core::document;
use crate::core::store::SecretStore;
use crate::error::{ResolveError, Result};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Environment,
    Store,
    Prompt,
    Default,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::Environment => "environment",
            Source::Store => "store",
            Source::Prompt => "prompt",
            Source::Default => "default",
        };
        f.write_str(s)
    }
}

/// One resolved value, tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: Source,
}

impl Resolved {
    fn new(value: impl Into<String>, source: Source) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }
}

/// Explicit environment lookup seam.
pub trait EnvLookup {
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

/// Interactive prompt seam.
pub trait Prompt {
    /// Whether a user is attached who can answer prompts.
    fn is_interactive(&self) -> bool;

    /// Ask for a value; empty input is a valid answer.
    fn ask(&self, text: &str) -> io::Result<String>;
}

/// Prompt on the controlling terminal via dialoguer.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        atty::is(atty::Stream::Stdin)
    }

    fn ask(&self, text: &str) -> io::Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(text)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

/// Resolves named configuration values against a store.
pub struct ConfigResolver<'a, E: EnvLookup, P: Prompt> {
    store: &'a mut SecretStore,
    env: E,
    prompt: P,
}

impl<'a, E: EnvLookup, P: Prompt> ConfigResolver<'a, E, P> {
    pub fn new(store: &'a mut SecretStore, env: E, prompt: P) -> Self {
        Self { store, env, prompt }
    }

    /// Resolve `name` through the priority chain.
    ///
    /// `error_if_empty` marks the value required: when no source can supply
    /// it (or the user answers with empty input), resolution fails with that
    /// message. An empty `error_if_empty` makes the value optional and an
    /// unresolvable name yields an empty string.
    pub fn resolve(
        &mut self,
        name: &str,
        prompt_text: &str,
        error_if_empty: &str,
        default: Option<&str>,
    ) -> Result<Resolved> {
        document::validate_key(name)?;

        // 1. Environment override, highest priority.
        if let Some(value) = self.env.get(name) {
            if !value.is_empty() {
                debug!(name, source = "environment", "resolved");
                return Ok(Resolved::new(value, Source::Environment));
            }
        }

        // 2. Encrypted store.
        if let Some(value) = self.store.try_get(name)? {
            if !value.is_empty() {
                debug!(name, source = "store", "resolved");
                return Ok(Resolved::new(value, Source::Store));
            }
        }

        // 3. Supplied default, even an empty one.
        if let Some(value) = default {
            debug!(name, source = "default", "resolved");
            return Ok(Resolved::new(value, Source::Default));
        }

        // 4. Interactive prompt; the answer is persisted best-effort.
        if self.prompt.is_interactive() {
            let value = self
                .prompt
                .ask(prompt_text)
                .map_err(ResolveError::PromptFailed)?;

            if !value.is_empty() {
                if let Err(e) = self.store.set(name, &value) {
                    warn!(name, error = %e, "could not persist prompted value");
                }
                return Ok(Resolved::new(value, Source::Prompt));
            }

            if !error_if_empty.is_empty() {
                return Err(ResolveError::RequiredEmpty {
                    name: name.to_string(),
                    message: error_if_empty.to_string(),
                }
                .into());
            }
            // An empty answer supplies nothing; fall back like any other
            // exhausted chain.
            return Ok(Resolved::new("", Source::Default));
        }

        // 5. Non-interactive, nothing left to try.
        if !error_if_empty.is_empty() {
            return Err(ResolveError::RequiredMissing {
                name: name.to_string(),
                message: error_if_empty.to_string(),
            }
            .into());
        }
        Ok(Resolved::new("", Source::Default))
    }
}
