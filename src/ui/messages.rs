//! One-line user notices for the CLI commands.
//!
//! Diagnostics go through `tracing`; these are the messages a user reads
//! after `init`, `run`, `report` and `config`.

use crate::utils::colors::{BLUE, BOLD, GREEN, RED, RESET, YELLOW};
use std::fmt;

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

fn notice(color: &str, icon: &str, msg: impl fmt::Display) -> String {
    format!("{color}{BOLD}{icon} {RESET}{msg}")
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}", notice(BLUE, ICON_INFO, msg));
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}", notice(GREEN, ICON_OK, msg));
}

/// Degraded but still usable result, e.g. a roster served from the cache.
pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}", notice(YELLOW, ICON_WARN, msg));
}

/// Written to stderr.
pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}", notice(RED, ICON_ERR, msg));
}

/// Banner opening a `run` or `report`, naming the analysed period.
pub fn header<T: fmt::Display>(msg: T) {
    println!("{BLUE}{BOLD}== {msg} =={RESET}\n");
}
