// src/export/fs_utils.rs

use crate::errors::AppResult;
use crate::export::notify_export_success;
use std::fs;
use std::path::{Path, PathBuf};

/// Build `{prefix}_{kind}_{stamp}.{ext}`; the prefix may contain directories.
pub(crate) fn report_path(prefix: &str, kind: &str, stamp: &str, ext: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}_{kind}_{stamp}.{ext}"))
}

/// Write a rendered report, creating missing parent directories.
pub(crate) fn save_report(path: &Path, content: &str, label: &str) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    notify_export_success(label, path);
    Ok(())
}
