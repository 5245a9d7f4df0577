//! Terminal output helpers.
//!
//! Styling goes through `console`, which honors NO_COLOR and non-tty output
//! on its own. A process-wide quiet gate (set once from the invocation
//! context) suppresses progress and confirmation text; errors, warnings, and
//! command return values on stdout are never suppressed.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use console::style;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Install the quiet gate. Called once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Success confirmation, e.g. `✓ set: API_KEY`.
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", style("✓").green(), msg);
    }
}

/// Error line on stderr. Never suppressed.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), msg);
}

/// Warning line on stderr. Never suppressed.
pub fn warn(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow(), msg);
}

/// Next-step hint, e.g. `→ run: satchel init`.
pub fn hint(msg: &str) {
    if !is_quiet() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    }
}

/// Indented label/value pair.
pub fn kv(label: &str, value: impl Display) {
    if !is_quiet() {
        println!("  {}  {}", style(label).dim(), style(value.to_string()).bold());
    }
}

/// Secondary information line.
pub fn dimmed(msg: &str) {
    if !is_quiet() {
        println!("{}", style(msg).dim());
    }
}
