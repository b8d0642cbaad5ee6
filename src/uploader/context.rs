use std::sync::Arc;
use tokio::time::Duration;

use crate::config::AppConfig;

use super::downloader::MediaDownloader;
use super::keep_alive::DEFAULT_KEEP_ALIVE_INTERVAL;
use super::policy::UploadLimits;
use super::transport::Transport;

/// Largest group the transport accepts in one message
pub const MAX_ALBUM_BATCH_SIZE: usize = 10;

/// Collaborators and limits shared by every uploader
#[derive(Clone)]
pub struct UploadContext {
    pub transport: Arc<dyn Transport>,
    pub downloader: Arc<dyn MediaDownloader>,
    pub limits: UploadLimits,
    pub keep_alive_interval: Duration,
    pub album_batch_size: usize,
}

impl UploadContext {
    pub fn new(transport: Arc<dyn Transport>, downloader: Arc<dyn MediaDownloader>) -> Self {
        Self {
            transport,
            downloader,
            limits: UploadLimits::default(),
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            album_batch_size: MAX_ALBUM_BATCH_SIZE,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        downloader: Arc<dyn MediaDownloader>,
    ) -> Self {
        Self {
            transport,
            downloader,
            limits: config.upload_limits(),
            keep_alive_interval: config.keep_alive_interval(),
            album_batch_size: config.album_batch_size.clamp(2, MAX_ALBUM_BATCH_SIZE),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Batch sizes outside 2..=10 are clamped into range
    pub fn with_album_batch_size(mut self, batch_size: usize) -> Self {
        self.album_batch_size = batch_size.clamp(2, MAX_ALBUM_BATCH_SIZE);
        self
    }
}
