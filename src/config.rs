use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::security::FileSystemGuard;
use crate::uploader::context::MAX_ALBUM_BATCH_SIZE;
use crate::uploader::policy::UploadLimits;

pub const BOT_TOKEN_ENV: &str = "MEDIA_COURIER_BOT_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bot_token: Option<String>,
    pub api_base_url: String,
    pub regular_max_upload_size: u64, // bytes
    pub photo_max_upload_size: u64,
    pub no_thumbnail_needed_size: u64,
    pub keep_alive_interval_secs: u64,
    pub album_batch_size: usize,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let limits = UploadLimits::default();
        Self {
            bot_token: None,
            api_base_url: "https://api.telegram.org".to_string(),
            regular_max_upload_size: limits.regular_max_upload_size,
            photo_max_upload_size: limits.photo_max_upload_size,
            no_thumbnail_needed_size: limits.no_thumbnail_needed_size,
            keep_alive_interval_secs: 5,
            album_batch_size: MAX_ALBUM_BATCH_SIZE,
            request_timeout_secs: 120,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            regular_max_upload_size: self.regular_max_upload_size,
            photo_max_upload_size: self.photo_max_upload_size,
            no_thumbnail_needed_size: self.no_thumbnail_needed_size,
        }
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Token from the environment, falling back to the config file
    pub fn resolve_bot_token(&self) -> AppResult<String> {
        std::env::var(BOT_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.bot_token.clone())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "No bot token configured; set {} or bot_token in the config file",
                    BOT_TOKEN_ENV
                ))
            })
    }
}

pub fn get_config_path() -> AppResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
        .join("media-courier");

    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("config.json"))
}

pub fn load_config() -> AppResult<AppConfig> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(config_path: &Path) -> AppResult<AppConfig> {
    if config_path.exists() {
        let config_str = fs::read_to_string(config_path)?;
        let config: AppConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
            log::warn!("Failed to parse config file: {}. Using defaults.", e);
            AppConfig::default()
        });

        validate_config(&config)?;

        Ok(config)
    } else {
        let default_config = AppConfig::default();
        save_config_to(config_path, &default_config)?;
        Ok(default_config)
    }
}

pub fn save_config_to(config_path: &Path, config: &AppConfig) -> AppResult<()> {
    validate_config(config)?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(config_path, config_str)?;

    log::info!("Configuration saved to {}", config_path.display());
    Ok(())
}

pub fn get_temp_directory() -> AppResult<PathBuf> {
    let temp_dir = FileSystemGuard::temp_root();
    fs::create_dir_all(&temp_dir)?;
    Ok(temp_dir)
}

pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    if config.regular_max_upload_size == 0
        || config.photo_max_upload_size == 0
        || config.no_thumbnail_needed_size == 0
    {
        return Err(AppError::validation("upload sizes", "Must be greater than 0"));
    }

    if config.photo_max_upload_size > config.regular_max_upload_size {
        return Err(AppError::validation(
            "photo_max_upload_size",
            "Must not exceed regular_max_upload_size",
        ));
    }

    if config.keep_alive_interval_secs == 0 {
        return Err(AppError::validation("keep_alive_interval_secs", "Must be greater than 0"));
    }

    if config.album_batch_size < 2 || config.album_batch_size > MAX_ALBUM_BATCH_SIZE {
        return Err(AppError::validation("album_batch_size", "Must be between 2 and 10"));
    }

    if config.request_timeout_secs == 0 {
        return Err(AppError::validation("request_timeout_secs", "Must be greater than 0"));
    }

    if !config.api_base_url.starts_with("http://") && !config.api_base_url.starts_with("https://") {
        return Err(AppError::validation("api_base_url", "Must be an http(s) URL"));
    }

    let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
    if !valid_log_levels.contains(&config.log_level.as_str()) {
        return Err(AppError::validation("log_level", "Must be a valid log level"));
    }

    Ok(())
}
