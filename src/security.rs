use regex::Regex;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};

/// Longest caption the Bot API accepts on media messages
pub const MAX_CAPTION_CHARS: usize = 1024;

const MAX_URL_LENGTH: usize = 2048;

pub struct InputValidator;

impl InputValidator {
    pub fn validate_media_url(url: &str) -> AppResult<()> {
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("url", "Media URL cannot be empty"));
        }

        if trimmed.len() > MAX_URL_LENGTH {
            return Err(AppError::validation("url", "Media URL too long"));
        }

        let url_pattern = Regex::new(r"^https?://[^\s/$.?#][^\s]*$")
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if !url_pattern.is_match(trimmed) {
            return Err(AppError::invalid_url(trimmed));
        }

        Ok(())
    }

    pub fn validate_bot_token(token: &str) -> AppResult<()> {
        let trimmed = token.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("bot_token", "Bot token cannot be empty"));
        }

        let token_pattern = Regex::new(r"^\d{5,20}:[A-Za-z0-9_\-]{35}$")
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if !token_pattern.is_match(trimmed) {
            return Err(AppError::validation("bot_token", "Bot token has an invalid format"));
        }

        Ok(())
    }

    /// Cut a caption down to the transport limit without splitting a character
    pub fn truncate_caption(caption: &str) -> String {
        if caption.chars().count() <= MAX_CAPTION_CHARS {
            return caption.to_string();
        }
        log::debug!(
            "Caption truncated from {} to {} characters",
            caption.chars().count(),
            MAX_CAPTION_CHARS
        );
        caption.chars().take(MAX_CAPTION_CHARS).collect()
    }
}

// File system utilities for downloaded media
pub struct FileSystemGuard;

impl FileSystemGuard {
    pub fn temp_root() -> PathBuf {
        std::env::temp_dir().join("media_courier")
    }

    /// Reserve a fresh, unguessable path for a downloaded file
    pub fn create_secure_temp_file(extension: &str) -> AppResult<PathBuf> {
        let temp_dir = Self::temp_root();
        std::fs::create_dir_all(&temp_dir)?;

        let random_name = uuid::Uuid::new_v4().to_string();
        let extension: String = extension
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(8)
            .collect();
        let extension = if extension.is_empty() {
            "tmp".to_string()
        } else {
            extension.to_lowercase()
        };

        Ok(temp_dir.join(format!("{}.{}", random_name, extension)))
    }

    pub fn get_file_size(path: &Path) -> AppResult<u64> {
        let metadata = std::fs::metadata(path)?;
        Ok(metadata.len())
    }
}
