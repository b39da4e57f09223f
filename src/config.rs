use crate::fetch::DEFAULT_SOURCE_URL;
use crate::refresh::DEFAULT_MAX_AGE_DAYS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "usb_ids.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIES: usize = 3;

/// Contents of `usbids.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UsbIdsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(alias = "max_age", skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<usize>,
}

impl UsbIdsConfig {
    /// Config with every default spelled out, as written by `usbids init`
    pub fn with_defaults() -> Self {
        Self {
            source_url: Some(DEFAULT_SOURCE_URL.to_string()),
            db_path: Some(PathBuf::from(DEFAULT_DB_PATH)),
            max_age_days: Some(DEFAULT_MAX_AGE_DAYS),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            retries: Some(DEFAULT_RETRIES),
        }
    }

    pub fn source_url(&self) -> &str {
        self.source_url.as_deref().unwrap_or(DEFAULT_SOURCE_URL)
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn retries(&self) -> usize {
        self.retries.unwrap_or(DEFAULT_RETRIES)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("usbids.toml")
}

/// Load the config file.
///
/// The default location is optional; an explicitly requested file must exist.
pub fn load_config(path: Option<&Path>) -> Result<UsbIdsConfig> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!("config file {} does not exist", path.display())));
        }
        return Ok(UsbIdsConfig::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: UsbIdsConfig = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn write_config(path: &Path, config: &UsbIdsConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
