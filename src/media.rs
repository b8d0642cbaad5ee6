use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of a media item; picks the download/send pair used for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Gif,
    Video,
}

impl MediaKind {
    /// Guess a kind from the file extension in a URL path
    pub fn from_url(url: &str) -> Self {
        match url_extension(url).as_deref() {
            Some("gif") | Some("gifv") => MediaKind::Gif,
            Some("mp4") | Some("webm") | Some("mov") | Some("mkv") => MediaKind::Video,
            _ => MediaKind::Photo,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Gif => write!(f, "gif"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Lowercased extension of the last path segment, ignoring query and fragment
pub fn url_extension(url: &str) -> Option<String> {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    let name = path.rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// A remote media item already resolved to a fetchable URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub kind: MediaKind,
    pub source_url: String,
    pub thumbnail_url: Option<String>,
    pub caption: Option<String>,
}

impl MediaReference {
    pub fn new(kind: MediaKind, source_url: impl Into<String>) -> Self {
        Self {
            kind,
            source_url: source_url.into(),
            thumbnail_url: None,
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(thumbnail_url.into());
        self
    }
}

/// Items of one album, in delivery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumReference {
    pub items: Vec<MediaReference>,
}

impl AlbumReference {
    pub fn new(items: Vec<MediaReference>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Where output goes. Passed through to the transport untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exclusively owned downloaded file.
///
/// The file is removed exactly once: by `release()` or on drop, whichever
/// happens first.
#[derive(Debug)]
pub struct LocalMediaHandle {
    path: PathBuf,
    released: bool,
}

impl LocalMediaHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed temporary file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for LocalMediaHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file() -> PathBuf {
        let path = std::env::temp_dir().join(format!("media_handle_{}.bin", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"data").unwrap();
        path
    }

    #[test]
    fn test_kind_from_url() {
        assert_eq!(MediaKind::from_url("https://i.redd.it/a.gif"), MediaKind::Gif);
        assert_eq!(MediaKind::from_url("https://v.redd.it/a/DASH_720.mp4?source=fallback"), MediaKind::Video);
        assert_eq!(MediaKind::from_url("https://i.redd.it/a.JPG"), MediaKind::Photo);
        assert_eq!(MediaKind::from_url("https://example.com/noext"), MediaKind::Photo);
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("https://i.redd.it/a.PNG?width=10").as_deref(), Some("png"));
        assert_eq!(url_extension("https://example.com/dir.d/file"), None);
        assert_eq!(url_extension("https://example.com/"), None);
    }

    #[test]
    fn test_handle_release_deletes_file() {
        let path = temp_file();
        let mut handle = LocalMediaHandle::new(&path);
        handle.release();
        assert!(!path.exists());
        assert!(handle.is_released());

        // A second release is a no-op, even if something reused the path
        std::fs::write(&path, b"other").unwrap();
        handle.release();
        drop(handle);
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_handle_drop_deletes_file() {
        let path = temp_file();
        {
            let _handle = LocalMediaHandle::new(&path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_release_of_missing_file_is_quiet() {
        let mut handle = LocalMediaHandle::new("/nonexistent/media_courier/file.bin");
        handle.release();
        assert!(handle.is_released());
    }
}
