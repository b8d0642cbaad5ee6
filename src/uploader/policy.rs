use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{AppError, AppResult};
use crate::security::FileSystemGuard;

/// Byte thresholds that shape how a downloaded file is delivered.
///
/// A file "fits" a limit when its size is strictly below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Anything at or above this is never uploaded; the user gets links instead
    pub regular_max_upload_size: u64,
    /// Photos at or above this are sent as documents
    pub photo_max_upload_size: u64,
    /// Files below this never get a thumbnail fetched for them
    pub no_thumbnail_needed_size: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            regular_max_upload_size: 50 * 1000 * 1000,
            photo_max_upload_size: 10 * 1000 * 1000,
            no_thumbnail_needed_size: 10 * 1000 * 1000,
        }
    }
}

/// Which transport call carries the main file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendAs {
    Photo,
    Document,
    Animation,
    Video,
}

/// Decision for one item, derived fresh from the current file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadDirective {
    pub send_as: SendAs,
    pub fetch_thumbnail: bool,
}

pub fn fits_size(size: u64, limit: u64) -> bool {
    size < limit
}

/// Compare a file's size on disk to a threshold
pub fn fits_transport_limit(path: &Path, limit: u64) -> AppResult<bool> {
    let size = FileSystemGuard::get_file_size(path)?;
    Ok(fits_size(size, limit))
}

/// Pure decision over a known size. `None` means the hard cap is exceeded.
pub fn directive_for_size(
    size: u64,
    requested: SendAs,
    has_thumbnail_url: bool,
    limits: &UploadLimits,
) -> Option<UploadDirective> {
    if !fits_size(size, limits.regular_max_upload_size) {
        return None;
    }

    let send_as = match requested {
        SendAs::Photo if !fits_size(size, limits.photo_max_upload_size) => SendAs::Document,
        other => other,
    };

    Some(UploadDirective {
        send_as,
        fetch_thumbnail: has_thumbnail_url && !fits_size(size, limits.no_thumbnail_needed_size),
    })
}

/// Stat the downloaded file and decide how to send it
pub fn plan_upload(
    path: &Path,
    requested: SendAs,
    thumbnail_url: Option<&str>,
    limits: &UploadLimits,
) -> AppResult<UploadDirective> {
    let size = FileSystemGuard::get_file_size(path)?;
    let has_thumbnail_url = thumbnail_url.map(|u| !u.is_empty()).unwrap_or(false);

    match directive_for_size(size, requested, has_thumbnail_url, limits) {
        Some(directive) => {
            log::debug!(
                "{} ({} bytes) will be sent as {:?}, thumbnail: {}",
                path.display(),
                size,
                directive.send_as,
                directive.fetch_thumbnail
            );
            Ok(directive)
        }
        None => Err(AppError::size_limit_exceeded(
            &path.to_string_lossy(),
            size,
            limits.regular_max_upload_size,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn limits() -> UploadLimits {
        UploadLimits {
            regular_max_upload_size: 1000,
            photo_max_upload_size: 100,
            no_thumbnail_needed_size: 50,
        }
    }

    #[test]
    fn test_photo_under_all_limits_stays_photo() {
        let d = directive_for_size(10, SendAs::Photo, true, &limits()).unwrap();
        assert_eq!(d.send_as, SendAs::Photo);
        assert!(!d.fetch_thumbnail);
    }

    #[test]
    fn test_large_photo_becomes_document() {
        let d = directive_for_size(100, SendAs::Photo, false, &limits()).unwrap();
        assert_eq!(d.send_as, SendAs::Document);

        let d = directive_for_size(999, SendAs::Photo, false, &limits()).unwrap();
        assert_eq!(d.send_as, SendAs::Document);
    }

    #[test]
    fn test_photo_downgrade_does_not_touch_other_kinds() {
        let d = directive_for_size(500, SendAs::Video, false, &limits()).unwrap();
        assert_eq!(d.send_as, SendAs::Video);
        let d = directive_for_size(500, SendAs::Animation, false, &limits()).unwrap();
        assert_eq!(d.send_as, SendAs::Animation);
    }

    #[test]
    fn test_hard_limit_aborts_every_kind() {
        for kind in [SendAs::Photo, SendAs::Document, SendAs::Animation, SendAs::Video] {
            assert!(directive_for_size(1000, kind, true, &limits()).is_none());
            assert!(directive_for_size(5000, kind, false, &limits()).is_none());
        }
    }

    #[test]
    fn test_thumbnail_needs_url_and_size() {
        assert!(!directive_for_size(49, SendAs::Video, true, &limits()).unwrap().fetch_thumbnail);
        assert!(directive_for_size(50, SendAs::Video, true, &limits()).unwrap().fetch_thumbnail);
        assert!(!directive_for_size(500, SendAs::Video, false, &limits()).unwrap().fetch_thumbnail);
    }

    #[test]
    fn test_plan_upload_reads_file_size() {
        let path = std::env::temp_dir().join(format!("policy_test_{}.bin", uuid::Uuid::new_v4()));
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0u8; 200]).unwrap();
        drop(file);

        let d = plan_upload(&path, SendAs::Photo, Some("https://t/thumb.jpg"), &limits()).unwrap();
        assert_eq!(d.send_as, SendAs::Document);
        assert!(d.fetch_thumbnail);

        let d = plan_upload(&path, SendAs::Photo, Some(""), &limits()).unwrap();
        assert!(!d.fetch_thumbnail);

        let tight = UploadLimits {
            regular_max_upload_size: 200,
            ..limits()
        };
        let result = plan_upload(&path, SendAs::Photo, None, &tight);
        assert!(matches!(result, Err(AppError::SizeLimitExceeded { size: 200, .. })));

        assert!(fits_transport_limit(&path, 201).unwrap());
        assert!(!fits_transport_limit(&path, 200).unwrap());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = fits_transport_limit(Path::new("/nonexistent/media_courier.bin"), 10);
        assert!(result.is_err());
    }
}
