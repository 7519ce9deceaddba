/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

/// Placeholder shown for a missing value.
pub fn dimmed_or<T: AsRef<str>>(value: Option<T>) -> String {
    match value {
        Some(v) if !v.as_ref().trim().is_empty() => v.as_ref().to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}
