use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::errors::AppResult;
use crate::media::ChatId;

/// "Still working" indications understood by the messaging endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatActivity {
    UploadPhoto,
    UploadVideo,
    UploadDocument,
}

impl ChatActivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatActivity::UploadPhoto => "upload_photo",
            ChatActivity::UploadVideo => "upload_video",
            ChatActivity::UploadDocument => "upload_document",
        }
    }
}

/// One element of a group delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendUnit {
    Photo {
        path: PathBuf,
        caption: Option<String>,
    },
    Video {
        path: PathBuf,
        caption: Option<String>,
    },
}

impl SendUnit {
    pub fn path(&self) -> &Path {
        match self {
            SendUnit::Photo { path, .. } | SendUnit::Video { path, .. } => path,
        }
    }

    pub fn caption(&self) -> Option<&str> {
        match self {
            SendUnit::Photo { caption, .. } | SendUnit::Video { caption, .. } => caption.as_deref(),
        }
    }
}

/// Send primitives of the messaging endpoint.
///
/// Every call is a single attempt; retries are the caller's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> AppResult<()>;

    async fn send_photo(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()>;

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()>;

    async fn send_animation(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()>;

    async fn send_video(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()>;

    async fn send_group(&self, chat: ChatId, units: &[SendUnit]) -> AppResult<()>;

    async fn send_activity(&self, chat: ChatId, activity: ChatActivity) -> AppResult<()>;
}
