use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::media::{url_extension, LocalMediaHandle};
use crate::security::{FileSystemGuard, InputValidator};

/// A downloaded video plus the separately served audio track, if any
#[derive(Debug)]
pub struct DownloadedVideo {
    pub file: LocalMediaHandle,
    pub audio_url: Option<String>,
}

/// A failed video download. The audio track may already be known even
/// though the video itself could not be fetched.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct VideoDownloadError {
    pub audio_url: Option<String>,
    pub source: AppError,
}

impl VideoDownloadError {
    pub fn with_audio(source: AppError, audio_url: impl Into<String>) -> Self {
        Self {
            audio_url: Some(audio_url.into()),
            source,
        }
    }
}

impl From<AppError> for VideoDownloadError {
    fn from(source: AppError) -> Self {
        Self {
            audio_url: None,
            source,
        }
    }
}

/// Fetches media into local files owned by the caller
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    async fn download_photo(&self, url: &str) -> AppResult<LocalMediaHandle>;

    async fn download_gif(&self, url: &str) -> AppResult<LocalMediaHandle>;

    async fn download_video(&self, url: &str) -> Result<DownloadedVideo, VideoDownloadError>;

    async fn download_thumbnail(&self, url: &str) -> AppResult<LocalMediaHandle>;
}

/// Plain HTTP(S) downloader writing into the temp directory
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn download_to_temp(&self, url: &str, default_extension: &str) -> AppResult<LocalMediaHandle> {
        InputValidator::validate_media_url(url)?;

        let extension = url_extension(url).unwrap_or_else(|| default_extension.to_string());
        // Owning the path before it exists means a partial file is removed on any error below
        let handle = LocalMediaHandle::new(FileSystemGuard::create_secure_temp_file(&extension)?);

        log::debug!("Downloading {} to {}", url, handle.path().display());

        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::download_failed(url, format!("HTTP status {}", status)));
        }

        let mut file = tokio::fs::File::create(handle.path()).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(AppError::download_failed(url, "empty response body"));
        }

        log::info!("Downloaded {} ({} bytes)", url, written);
        Ok(handle)
    }
}

#[async_trait]
impl MediaDownloader for HttpDownloader {
    async fn download_photo(&self, url: &str) -> AppResult<LocalMediaHandle> {
        self.download_to_temp(url, "jpg").await
    }

    async fn download_gif(&self, url: &str) -> AppResult<LocalMediaHandle> {
        self.download_to_temp(url, "mp4").await
    }

    async fn download_video(&self, url: &str) -> Result<DownloadedVideo, VideoDownloadError> {
        let file = self.download_to_temp(url, "mp4").await?;
        Ok(DownloadedVideo {
            file,
            audio_url: None,
        })
    }

    async fn download_thumbnail(&self, url: &str) -> AppResult<LocalMediaHandle> {
        self.download_to_temp(url, "jpg")
            .await
            .map_err(|e| AppError::thumbnail_failed(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_url_without_leaving_files() {
        let downloader = HttpDownloader::new(Duration::from_secs(5)).unwrap();
        let result = downloader.download_photo("not a url").await;
        assert!(matches!(result, Err(AppError::InvalidUrl { .. }) | Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_video_failure_carries_no_audio() {
        let downloader = HttpDownloader::new(Duration::from_secs(5)).unwrap();
        let err = downloader.download_video("not a url").await.unwrap_err();
        assert!(err.audio_url.is_none());
        assert_eq!(err.to_string(), err.source.to_string());
    }

    #[test]
    fn test_video_error_keeps_audio_url() {
        let err = VideoDownloadError::with_audio(
            AppError::download_failed("https://v.redd.it/x/DASH_720.mp4", "mux failed"),
            "https://v.redd.it/x/DASH_audio.mp4",
        );
        assert_eq!(err.audio_url.as_deref(), Some("https://v.redd.it/x/DASH_audio.mp4"));
        assert!(matches!(err.source, AppError::DownloadFailed { .. }));
    }

    #[tokio::test]
    async fn test_thumbnail_errors_are_tagged() {
        let downloader = HttpDownloader::new(Duration::from_secs(5)).unwrap();
        let result = downloader.download_thumbnail("ftp://example.com/t.jpg").await;
        assert!(matches!(result, Err(AppError::ThumbnailFailed { .. })));
    }
}
