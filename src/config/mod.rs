use crate::core::clock::parse_timezone;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod settings;

pub use settings::{FilterRules, Settings, WorkingHours};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default)]
    pub github_token: String,
    #[serde(default = "default_api_url")]
    pub github_api_url: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub team: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_work_start")]
    pub work_start_hour: i64,
    #[serde(default = "default_work_end")]
    pub work_end_hour: i64,
    #[serde(default)]
    pub exclusion_list: Vec<String>,
    #[serde(default)]
    pub email_suffix_filter: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_work_start() -> i64 {
    9
}
fn default_work_end() -> i64 {
    18
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            github_token: String::new(),
            github_api_url: default_api_url(),
            organization: String::new(),
            team: String::new(),
            timezone: default_timezone(),
            work_start_hour: default_work_start(),
            work_end_hour: default_work_end(),
            exclusion_list: Vec::new(),
            email_suffix_filter: String::new(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory (`~/.prmonitor`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".prmonitor")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("prmonitor.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("prmonitor.sqlite")
    }

    /// Load the configuration file (defaults when missing), then apply
    /// environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut cfg = Self::load_file(&Self::config_file())?;
        cfg.apply_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn load_file(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply overrides looked up by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GITHUB_TOKEN") {
            self.github_token = v;
        }
        if let Some(v) = lookup("GITHUB_API_URL") {
            self.github_api_url = v;
        }
        if let Some(v) = lookup("GITHUB_ORGANIZATION") {
            self.organization = v;
        }
        if let Some(v) = lookup("GITHUB_TEAM") {
            self.team = v;
        }
        if let Some(v) = lookup("PROJECT_TIMEZONE") {
            self.timezone = v;
        }
        if let Some(v) = lookup("WORK_START_HOUR") {
            self.work_start_hour = parse_hour("WORK_START_HOUR", &v)?;
        }
        if let Some(v) = lookup("WORK_END_HOUR") {
            self.work_end_hour = parse_hour("WORK_END_HOUR", &v)?;
        }
        if let Some(v) = lookup("EXCLUSION_LIST") {
            self.exclusion_list = split_list(&v);
        }
        if let Some(v) = lookup("EMAIL_SUFFIX_FILTER") {
            self.email_suffix_filter = v;
        }
        if let Some(v) = lookup("DATABASE_PATH") {
            self.database = v;
        }
        Ok(())
    }

    /// Return every problem found; an empty list means the config is usable.
    ///
    /// Remote credentials are only required when the GitHub source is used.
    pub fn validate(&self, require_remote: bool) -> Vec<String> {
        let mut errors = Vec::new();

        if require_remote {
            if self.github_token.trim().is_empty() {
                errors.push("GITHUB_TOKEN is required".to_string());
            }
            if self.organization.trim().is_empty() {
                errors.push("GITHUB_ORGANIZATION is required".to_string());
            }
            if self.team.trim().is_empty() {
                errors.push("GITHUB_TEAM is required".to_string());
            }
        }

        if parse_timezone(&self.timezone).is_err() {
            errors.push(format!("Invalid timezone: {}", self.timezone));
        }

        if !(0..=23).contains(&self.work_start_hour) {
            errors.push("WORK_START_HOUR must be between 0 and 23".to_string());
        }
        if !(0..=23).contains(&self.work_end_hour) {
            errors.push("WORK_END_HOUR must be between 0 and 23".to_string());
        }
        if self.work_start_hour >= self.work_end_hour {
            errors.push("WORK_START_HOUR must be less than WORK_END_HOUR".to_string());
        }

        errors
    }

    /// Build the immutable settings value used by the analysis.
    pub fn settings(&self) -> AppResult<Settings> {
        let errors = self.validate(false);
        if !errors.is_empty() {
            return Err(AppError::Config(errors.join("; ")));
        }

        let timezone = parse_timezone(&self.timezone)?;
        let exclusion_set: BTreeSet<String> = self
            .exclusion_list
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Settings {
            timezone,
            hours: WorkingHours::new(self.work_start_hour as u32, self.work_end_hour as u32),
            filter: FilterRules {
                exclusion_set,
                email_suffix_filter: self.email_suffix_filter.trim().to_string(),
            },
        })
    }

    /// Create the config directory, the config file (unless present) and an
    /// empty database file.
    pub fn init_all(custom_db: Option<String>) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let cfg_path = Self::config_file();
        if !cfg_path.exists() {
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| AppError::Config(format!("cannot serialize config: {e}")))?;
            let mut file = fs::File::create(&cfg_path)?;
            file.write_all(yaml.as_bytes())?;
        }

        if !db_path.exists() {
            if let Some(parent) = db_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}

fn parse_hour(key: &str, value: &str) -> AppResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::Config(format!("{key} must be an integer, got '{value}'")))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
