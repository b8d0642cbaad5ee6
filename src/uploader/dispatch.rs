use std::fmt;
use tokio::task::JoinHandle;

use crate::media::{AlbumReference, ChatId, MediaKind, MediaReference};

use super::album::AlbumUploader;
use super::context::UploadContext;
use super::outcome::{AlbumReport, UploadOutcome};
use super::single::SingleUploader;

/// One user request, already resolved to fetchable media
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryRequest {
    Photo {
        url: String,
        title: Option<String>,
        thumbnail_url: Option<String>,
        as_photo: bool,
    },
    Gif {
        url: String,
        title: Option<String>,
        thumbnail_url: Option<String>,
    },
    Video {
        url: String,
        title: Option<String>,
        thumbnail_url: Option<String>,
    },
    Album(AlbumReference),
}

impl DeliveryRequest {
    /// Request for a single reference; `as_photo` only matters for photos
    pub fn from_reference(media: MediaReference, as_photo: bool) -> Self {
        let MediaReference {
            kind,
            source_url: url,
            thumbnail_url,
            caption: title,
        } = media;

        match kind {
            MediaKind::Photo => DeliveryRequest::Photo {
                url,
                title,
                thumbnail_url,
                as_photo,
            },
            MediaKind::Gif => DeliveryRequest::Gif {
                url,
                title,
                thumbnail_url,
            },
            MediaKind::Video => DeliveryRequest::Video {
                url,
                title,
                thumbnail_url,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Single(UploadOutcome),
    Album(AlbumReport),
}

impl fmt::Display for DeliveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryResult::Single(outcome) => write!(f, "{}", outcome),
            DeliveryResult::Album(report) => write!(
                f,
                "album: {}/{} item(s) downloaded, {} group(s) and {} single(s) sent, {} send(s) failed",
                report.downloaded,
                report.requested,
                report.groups_sent,
                report.singles_sent,
                report.groups_failed + report.singles_failed
            ),
        }
    }
}

/// Entry point routing requests to the right uploader.
///
/// Requests share nothing mutable, so any number may run at once.
#[derive(Clone)]
pub struct Courier {
    ctx: UploadContext,
}

impl Courier {
    pub fn new(ctx: UploadContext) -> Self {
        Self { ctx }
    }

    pub async fn deliver(&self, request: DeliveryRequest, chat: ChatId) -> DeliveryResult {
        let single = || SingleUploader::new(self.ctx.clone());

        match request {
            DeliveryRequest::Photo {
                url,
                title,
                thumbnail_url,
                as_photo,
            } => DeliveryResult::Single(
                single()
                    .upload_photo(&url, title.as_deref(), thumbnail_url.as_deref(), chat, as_photo)
                    .await,
            ),
            DeliveryRequest::Gif {
                url,
                title,
                thumbnail_url,
            } => DeliveryResult::Single(
                single()
                    .upload_gif(&url, title.as_deref(), thumbnail_url.as_deref(), chat)
                    .await,
            ),
            DeliveryRequest::Video {
                url,
                title,
                thumbnail_url,
            } => DeliveryResult::Single(
                single()
                    .upload_video(&url, title.as_deref(), thumbnail_url.as_deref(), chat)
                    .await,
            ),
            DeliveryRequest::Album(album) => DeliveryResult::Album(
                AlbumUploader::new(self.ctx.clone())
                    .upload_album(&album, chat)
                    .await,
            ),
        }
    }

    /// Run a request on its own task
    pub fn spawn_delivery(&self, request: DeliveryRequest, chat: ChatId) -> JoinHandle<DeliveryResult> {
        let courier = self.clone();
        tokio::spawn(async move { courier.deliver(request, chat).await })
    }
}
