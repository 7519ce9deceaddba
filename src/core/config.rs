use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, success, warning};
use std::fs;
use std::path::Path;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(path: &Path) -> AppResult<()> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        println!("{}", content);
        Ok(())
    }

    /// Report every configuration problem. Fails when any is found.
    pub fn check(cfg: &Config) -> AppResult<()> {
        let problems = cfg.validate(true);

        if problems.is_empty() {
            success("Configuration validated successfully");
            return Ok(());
        }

        for p in &problems {
            error(p);
        }
        warning("Edit the configuration file or set the matching environment variables.");

        Err(AppError::Config(format!(
            "{} problem(s) found",
            problems.len()
        )))
    }
}
