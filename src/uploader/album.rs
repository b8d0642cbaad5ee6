use std::ops::Range;

use crate::errors::AppResult;
use crate::media::{AlbumReference, ChatId, LocalMediaHandle, MediaKind, MediaReference};

use super::context::UploadContext;
use super::keep_alive::KeepAlive;
use super::outcome::AlbumReport;
use super::transport::{ChatActivity, SendUnit};

/// One transport call of an album delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    /// Group delivery over a range of prepared units
    Group(Range<usize>),
    /// A lone leftover unit, sent with the ordinary single-send call
    Single(usize),
}

/// Split `count` units into full groups of `batch_size`, then a trailing
/// group for 2 or more leftovers or a single send for exactly one.
pub fn plan_batches(count: usize, batch_size: usize) -> Vec<Batch> {
    let batch_size = batch_size.max(2);
    let full_groups = count / batch_size;
    let mut batches: Vec<Batch> = (0..full_groups)
        .map(|i| Batch::Group(i * batch_size..(i + 1) * batch_size))
        .collect();

    let start = full_groups * batch_size;
    match count - start {
        0 => {}
        1 => batches.push(Batch::Single(start)),
        _ => batches.push(Batch::Group(start..count)),
    }

    batches
}

/// Downloads every album item and delivers them in transport-sized groups
pub struct AlbumUploader {
    ctx: UploadContext,
}

impl AlbumUploader {
    pub fn new(ctx: UploadContext) -> Self {
        Self { ctx }
    }

    pub async fn upload_album(&self, album: &AlbumReference, chat: ChatId) -> AlbumReport {
        let mut keep_alive = KeepAlive::start(
            self.ctx.transport.clone(),
            chat,
            ChatActivity::UploadPhoto,
            self.ctx.keep_alive_interval,
        );

        let mut report = AlbumReport::new(album.len());
        let mut files: Vec<LocalMediaHandle> = Vec::with_capacity(album.len());
        let mut units: Vec<SendUnit> = Vec::with_capacity(album.len());

        for (index, item) in album.items.iter().enumerate() {
            match self.download_item(item).await {
                Ok(file) => {
                    units.push(send_unit_for(item, &file));
                    files.push(file);
                }
                Err(e) => {
                    log::warn!(
                        "Cannot download album item {} ({}) for chat {}: {}",
                        index + 1,
                        item.source_url,
                        chat,
                        e
                    );
                    report.skipped += 1;
                }
            }
        }
        report.downloaded = units.len();

        let batches = plan_batches(units.len(), self.ctx.album_batch_size);
        log::info!(
            "Sending album of {} item(s) to chat {} in {} call(s)",
            units.len(),
            chat,
            batches.len()
        );

        for batch in batches {
            match batch {
                Batch::Group(range) => {
                    let size = range.len();
                    match self.ctx.transport.send_group(chat, &units[range]).await {
                        Ok(()) => report.groups_sent += 1,
                        Err(e) => {
                            log::warn!("Cannot upload album group of {} to chat {}: {}", size, chat, e);
                            report.groups_failed += 1;
                        }
                    }
                }
                Batch::Single(index) => match self.send_single(chat, &units[index]).await {
                    Ok(()) => report.singles_sent += 1,
                    Err(e) => {
                        log::warn!("Cannot upload last album item to chat {}: {}", chat, e);
                        report.singles_failed += 1;
                    }
                },
            }
        }

        for file in files.iter_mut() {
            file.release();
        }
        keep_alive.stop().await;

        report.log_summary();
        report
    }

    async fn download_item(&self, item: &MediaReference) -> AppResult<LocalMediaHandle> {
        let downloader = &self.ctx.downloader;
        match item.kind {
            MediaKind::Photo => downloader.download_photo(&item.source_url).await,
            MediaKind::Gif => downloader.download_gif(&item.source_url).await,
            MediaKind::Video => downloader
                .download_video(&item.source_url)
                .await
                .map(|video| video.file)
                .map_err(|e| e.source),
        }
    }

    async fn send_single(&self, chat: ChatId, unit: &SendUnit) -> AppResult<()> {
        let transport = &self.ctx.transport;
        match unit {
            SendUnit::Photo { path, caption } => {
                transport
                    .send_photo(chat, path, caption.as_deref(), None)
                    .await
            }
            SendUnit::Video { path, caption } => {
                transport
                    .send_video(chat, path, caption.as_deref(), None)
                    .await
            }
        }
    }
}

/// Gifs travel as videos inside a group delivery
fn send_unit_for(item: &MediaReference, file: &LocalMediaHandle) -> SendUnit {
    let path = file.path().to_path_buf();
    let caption = item.caption.clone();
    match item.kind {
        MediaKind::Photo => SendUnit::Photo { path, caption },
        MediaKind::Gif | MediaKind::Video => SendUnit::Video { path, caption },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(batches: &[Batch]) -> (usize, usize) {
        let groups = batches.iter().filter(|b| matches!(b, Batch::Group(_))).count();
        let singles = batches.iter().filter(|b| matches!(b, Batch::Single(_))).count();
        (groups, singles)
    }

    #[test]
    fn test_plan_matches_batch_arithmetic() {
        for n in 0..=45 {
            let batches = plan_batches(n, 10);
            let (groups, singles) = counts(&batches);
            let expected_groups = n / 10 + usize::from((2..=9).contains(&(n % 10)));
            assert_eq!(groups, expected_groups, "groups for n={}", n);
            assert_eq!(singles, usize::from(n % 10 == 1), "singles for n={}", n);
        }
    }

    #[test]
    fn test_plan_23_items() {
        assert_eq!(
            plan_batches(23, 10),
            vec![Batch::Group(0..10), Batch::Group(10..20), Batch::Group(20..23)]
        );
    }

    #[test]
    fn test_plan_21_items() {
        assert_eq!(
            plan_batches(21, 10),
            vec![Batch::Group(0..10), Batch::Group(10..20), Batch::Single(20)]
        );
    }

    #[test]
    fn test_plan_covers_every_index_once_in_order() {
        let batches = plan_batches(37, 10);
        let mut seen = Vec::new();
        for batch in batches {
            match batch {
                Batch::Group(range) => seen.extend(range),
                Batch::Single(i) => seen.push(i),
            }
        }
        assert_eq!(seen, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_albums() {
        assert!(plan_batches(0, 10).is_empty());
        assert_eq!(plan_batches(1, 10), vec![Batch::Single(0)]);
        assert_eq!(plan_batches(2, 10), vec![Batch::Group(0..2)]);
        assert_eq!(plan_batches(10, 10), vec![Batch::Group(0..10)]);
    }

    #[test]
    fn test_gif_becomes_video_unit() {
        let file = LocalMediaHandle::new("/nonexistent/media_courier/a.mp4");
        let item = MediaReference::new(MediaKind::Gif, "https://i.redd.it/a.gif").with_caption("loop");
        assert_eq!(
            send_unit_for(&item, &file),
            SendUnit::Video {
                path: "/nonexistent/media_courier/a.mp4".into(),
                caption: Some("loop".to_string()),
            }
        );
    }
}
