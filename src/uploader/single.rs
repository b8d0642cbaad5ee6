use crate::errors::AppError;
use crate::media::{ChatId, LocalMediaHandle, MediaKind, MediaReference};

use super::context::UploadContext;
use super::keep_alive::KeepAlive;
use super::messages::{fallback_message, FallbackLinks};
use super::outcome::{FallbackReason, UploadOutcome};
use super::policy::{plan_upload, SendAs};
use super::transport::ChatActivity;

/// Downloads one item, applies the size policy and sends it
pub struct SingleUploader {
    ctx: UploadContext,
}

impl SingleUploader {
    pub fn new(ctx: UploadContext) -> Self {
        Self { ctx }
    }

    /// Upload a media reference using the call matching its kind
    pub async fn upload(&self, media: &MediaReference, chat: ChatId, as_photo: bool) -> UploadOutcome {
        let title = media.caption.as_deref();
        let thumbnail_url = media.thumbnail_url.as_deref();

        match media.kind {
            MediaKind::Photo => {
                self.upload_photo(&media.source_url, title, thumbnail_url, chat, as_photo)
                    .await
            }
            MediaKind::Gif => {
                self.upload_gif(&media.source_url, title, thumbnail_url, chat)
                    .await
            }
            MediaKind::Video => {
                self.upload_video(&media.source_url, title, thumbnail_url, chat)
                    .await
            }
        }
    }

    pub async fn upload_photo(
        &self,
        photo_url: &str,
        title: Option<&str>,
        thumbnail_url: Option<&str>,
        chat: ChatId,
        as_photo: bool,
    ) -> UploadOutcome {
        let activity = if as_photo {
            ChatActivity::UploadPhoto
        } else {
            ChatActivity::UploadDocument
        };
        let mut keep_alive = self.start_keep_alive(chat, activity);

        let links = FallbackLinks::Image(photo_url);
        let outcome = match self.ctx.downloader.download_photo(photo_url).await {
            Ok(mut file) => {
                let requested = if as_photo { SendAs::Photo } else { SendAs::Document };
                let outcome = self
                    .deliver(&file, MediaKind::Photo, requested, title, thumbnail_url, chat, links)
                    .await;
                file.release();
                outcome
            }
            Err(e) => self.download_failed(photo_url, e, chat, links).await,
        };

        keep_alive.stop().await;
        outcome
    }

    pub async fn upload_gif(
        &self,
        gif_url: &str,
        title: Option<&str>,
        thumbnail_url: Option<&str>,
        chat: ChatId,
    ) -> UploadOutcome {
        let mut keep_alive = self.start_keep_alive(chat, ChatActivity::UploadVideo);

        let links = FallbackLinks::File(gif_url);
        let outcome = match self.ctx.downloader.download_gif(gif_url).await {
            Ok(mut file) => {
                let outcome = self
                    .deliver(&file, MediaKind::Gif, SendAs::Animation, title, thumbnail_url, chat, links)
                    .await;
                file.release();
                outcome
            }
            Err(e) => self.download_failed(gif_url, e, chat, links).await,
        };

        keep_alive.stop().await;
        outcome
    }

    pub async fn upload_video(
        &self,
        video_url: &str,
        title: Option<&str>,
        thumbnail_url: Option<&str>,
        chat: ChatId,
    ) -> UploadOutcome {
        let mut keep_alive = self.start_keep_alive(chat, ChatActivity::UploadVideo);

        let outcome = match self.ctx.downloader.download_video(video_url).await {
            Ok(video) => {
                let mut file = video.file;
                let links = FallbackLinks::Video {
                    video_url,
                    audio_url: video.audio_url.as_deref(),
                };
                let outcome = self
                    .deliver(&file, MediaKind::Video, SendAs::Video, title, thumbnail_url, chat, links)
                    .await;
                file.release();
                outcome
            }
            Err(e) => {
                let links = FallbackLinks::Video {
                    video_url,
                    audio_url: e.audio_url.as_deref(),
                };
                self.download_failed(video_url, e.source, chat, links).await
            }
        };

        keep_alive.stop().await;
        outcome
    }

    fn start_keep_alive(&self, chat: ChatId, activity: ChatActivity) -> KeepAlive {
        KeepAlive::start(
            self.ctx.transport.clone(),
            chat,
            activity,
            self.ctx.keep_alive_interval,
        )
    }

    /// Policy, optional thumbnail, send. The caller owns and releases `file`.
    #[allow(clippy::too_many_arguments)]
    async fn deliver(
        &self,
        file: &LocalMediaHandle,
        kind: MediaKind,
        requested: SendAs,
        title: Option<&str>,
        thumbnail_url: Option<&str>,
        chat: ChatId,
        links: FallbackLinks<'_>,
    ) -> UploadOutcome {
        let directive = match plan_upload(file.path(), requested, thumbnail_url, &self.ctx.limits) {
            Ok(directive) => directive,
            Err(AppError::SizeLimitExceeded { size, limit, .. }) => {
                log::debug!("{} of {} bytes exceeds the {} byte limit", kind, size, limit);
                return self.fallback(chat, FallbackReason::TooLarge, links).await;
            }
            Err(e) => {
                log::debug!("Cannot inspect downloaded {}: {}", kind, e);
                return self.fallback(chat, FallbackReason::SendFailed, links).await;
            }
        };

        let mut thumbnail = match (directive.fetch_thumbnail, thumbnail_url) {
            (true, Some(url)) => match self.ctx.downloader.download_thumbnail(url).await {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::debug!("Continuing without thumbnail: {}", e);
                    None
                }
            },
            _ => None,
        };

        let thumbnail_path = thumbnail.as_ref().map(|t| t.path());
        let transport = &self.ctx.transport;
        let path = file.path();
        let result = match directive.send_as {
            SendAs::Photo => transport.send_photo(chat, path, title, thumbnail_path).await,
            SendAs::Document => transport.send_document(chat, path, title, thumbnail_path).await,
            SendAs::Animation => transport.send_animation(chat, path, title, thumbnail_path).await,
            SendAs::Video => transport.send_video(chat, path, title, thumbnail_path).await,
        };

        if let Some(thumbnail) = thumbnail.as_mut() {
            thumbnail.release();
        }

        match result {
            Ok(()) => {
                log::info!("Delivered {} to chat {} as {:?}", kind, chat, directive.send_as);
                UploadOutcome::Delivered {
                    kind,
                    as_document: directive.send_as == SendAs::Document,
                }
            }
            Err(e) => {
                log::debug!("Sending {} to chat {} failed: {}", kind, chat, e);
                self.fallback(chat, FallbackReason::SendFailed, links).await
            }
        }
    }

    async fn download_failed(
        &self,
        url: &str,
        error: AppError,
        chat: ChatId,
        links: FallbackLinks<'_>,
    ) -> UploadOutcome {
        log::debug!("Cannot download {}: {}", url, error);
        self.fallback(chat, FallbackReason::DownloadFailed, links).await
    }

    /// Hand the user the original links instead of the file
    async fn fallback(&self, chat: ChatId, reason: FallbackReason, links: FallbackLinks<'_>) -> UploadOutcome {
        let text = fallback_message(reason, links);
        if let Err(e) = self.ctx.transport.send_text(chat, &text).await {
            log::warn!(
                "Could not tell chat {} about a failed upload ({}): {}",
                chat,
                reason,
                e
            );
        }
        UploadOutcome::FallbackSent { reason }
    }
}
