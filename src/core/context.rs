//! Invocation context and quiet-mode detection.
//!
//! When satchel is invoked as a helper from inside another satchel invocation
//! (an editor hook, an entry script spawned by `edit`), progress output would
//! be printed twice. The outer invocation marks its children with
//! `SATCHEL_NESTED`, and nested invocations run quiet. This is presentation
//! only: return values, exit codes, and persisted state are unaffected.

use crate::core::constants;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Normal,
    Quiet,
}

/// How the current invocation was entered.
#[derive(Debug, Clone, Copy)]
pub struct InvocationContext {
    verbosity: Verbosity,
}

impl InvocationContext {
    /// Detect verbosity from the explicit `--quiet` flag and the nesting
    /// marker. The marker is the one ambient signal this type reads.
    pub fn detect(explicit_quiet: bool) -> Self {
        let nested = std::env::var_os(constants::ENV_NESTED).is_some();
        Self::from_parts(explicit_quiet, nested)
    }

    pub fn from_parts(explicit_quiet: bool, nested: bool) -> Self {
        let verbosity = if explicit_quiet || nested {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        };
        Self { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Mark a child process so its satchel invocations run quiet.
    pub fn mark_nested(cmd: &mut std::process::Command) {
        cmd.env(constants::ENV_NESTED, "1");
    }
}
