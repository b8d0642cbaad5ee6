// Media delivery pipeline
//
// Downloads media, decides how the endpoint can take it and sends it while
// keeping the chat's activity indicator alive

pub mod album;
pub mod context;
pub mod dispatch;
pub mod downloader;
pub mod keep_alive;
pub mod messages;
pub mod outcome;
pub mod policy;
pub mod single;
pub mod telegram_client;
pub mod transport;

pub use album::AlbumUploader;
pub use context::UploadContext;
pub use dispatch::{Courier, DeliveryRequest, DeliveryResult};
pub use downloader::{DownloadedVideo, HttpDownloader, MediaDownloader, VideoDownloadError};
pub use keep_alive::KeepAlive;
pub use outcome::{AlbumReport, FallbackReason, UploadOutcome};
pub use policy::UploadLimits;
pub use single::SingleUploader;
pub use telegram_client::TelegramClient;
pub use transport::{ChatActivity, SendUnit, Transport};
