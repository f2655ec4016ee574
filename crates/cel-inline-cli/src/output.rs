// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI output formatting with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.

use colored::{ColoredString, Colorize};

/// Initialize color support based on environment.
pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn hint_label() -> ColoredString {
    "hint".cyan()
}

pub fn command_name(name: &str) -> ColoredString {
    name.green()
}

/// Print `error: <msg>` to stderr, with an optional hint line.
pub fn show_error(msg: &str, hint: Option<&str>) {
    eprintln!("{}: {}", error_label(), msg);
    if let Some(hint) = hint {
        eprintln!("  {}: {}", hint_label(), hint.dimmed());
    }
}
