// src/export/mod.rs

pub mod console;
mod fs_utils;
pub mod logic;
pub mod model;
pub mod render;

pub use logic::ReportLogic;

use crate::ui::messages::success;
use std::path::Path;

/// Shared completion message for saved reports.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} report saved: {}", path.display()));
}
