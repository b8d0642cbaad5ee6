use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("File too large: {path} is {size} bytes, limit is {limit} bytes")]
    SizeLimitExceeded { path: String, size: u64, limit: u64 },

    #[error("Cannot download thumbnail {url}: {reason}")]
    ThumbnailFailed { url: String, reason: String },

    #[error("Send failed: {reason}")]
    SendFailed { reason: String },

    #[error("Telegram API error in {method} ({code}): {description}")]
    TelegramApi {
        method: String,
        code: i64,
        description: String,
    },

    #[error("Invalid media URL: {url}")]
    InvalidUrl { url: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn download_failed(url: &str, reason: impl ToString) -> Self {
        Self::DownloadFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn thumbnail_failed(url: &str, reason: impl ToString) -> Self {
        Self::ThumbnailFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn size_limit_exceeded(path: &str, size: u64, limit: u64) -> Self {
        Self::SizeLimitExceeded {
            path: path.to_string(),
            size,
            limit,
        }
    }

    pub fn send_failed(reason: impl ToString) -> Self {
        Self::SendFailed {
            reason: reason.to_string(),
        }
    }

    pub fn invalid_url(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
        }
    }

    /// Errors raised while talking to the messaging endpoint
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::SendFailed { .. } | AppError::TelegramApi { .. }
        )
    }

    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            AppError::InvalidUrl { .. }
                | AppError::SizeLimitExceeded { .. }
                | AppError::Validation { .. }
                | AppError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(AppError::send_failed("boom").is_transport_error());
        assert!(!AppError::send_failed("boom").is_permanent());
        assert!(AppError::size_limit_exceeded("/tmp/a.mp4", 10, 5).is_permanent());
        assert!(!AppError::download_failed("https://x/y", "404").is_transport_error());
    }

    #[test]
    fn test_display_includes_url() {
        let error = AppError::download_failed("https://example.com/a.jpg", "status 404");
        let text = error.to_string();
        assert!(text.contains("https://example.com/a.jpg"));
        assert!(text.contains("404"));
    }
}
