//! Runtime settings.
//!
//! Resolved as defaults, then environment (`.env` is loaded by the binary),
//! then CLI flags through the `with_*` builders.

use std::env;
use std::path::PathBuf;

use crate::catalog::CategoryMap;
use crate::error::{ConfigError, ConfigResult};

pub const ENV_DATA: &str = "RETAIL_PROMO_DATA";
pub const ENV_CATEGORIES: &str = "RETAIL_PROMO_CATEGORIES";
pub const ENV_LOG_FILE: &str = "RETAIL_PROMO_LOG_FILE";
pub const ENV_PORT: &str = "RETAIL_PROMO_PORT";

pub const DEFAULT_DATA_PATH: &str = "retail_promo.csv";
pub const DEFAULT_LOG_FILE: &str = "app.log";
pub const DEFAULT_PORT: u16 = 3000;

/// Largest CSV accepted by `POST /api/analyze` (50 MB)
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Transaction CSV
    pub data_path: PathBuf,
    /// Category map JSON; the built-in map when `None`
    pub categories_path: Option<PathBuf>,
    /// Log file, truncated at start; no file logging when `None`
    pub log_file: Option<PathBuf>,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            categories_path: None,
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(data) = lookup(ENV_DATA).filter(|v| !v.trim().is_empty()) {
            settings.data_path = PathBuf::from(data);
        }

        if let Some(categories) = lookup(ENV_CATEGORIES).filter(|v| !v.trim().is_empty()) {
            settings.categories_path = Some(PathBuf::from(categories));
        }

        // Set but empty disables the file
        if let Some(log_file) = lookup(ENV_LOG_FILE) {
            settings.log_file = if log_file.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(log_file))
            };
        }

        if let Some(port) = lookup(ENV_PORT) {
            settings.port = parse_port(&port)?;
        }

        Ok(settings)
    }

    pub fn with_data_path(mut self, path: PathBuf) -> Self {
        self.data_path = path;
        self
    }

    pub fn with_categories_path(mut self, path: PathBuf) -> Self {
        self.categories_path = Some(path);
        self
    }

    /// An empty path disables file logging
    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Load the configured category map, or the built-in one
    pub fn category_map(&self) -> ConfigResult<CategoryMap> {
        match &self.categories_path {
            Some(path) => CategoryMap::from_path(path),
            None => Ok(CategoryMap::default()),
        }
    }
}

fn parse_port(value: &str) -> ConfigResult<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: ENV_PORT.to_string(),
            value: value.to_string(),
        })
}
