use std::fmt;

use crate::media::MediaKind;

/// Why a single item ended in a link-only message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    DownloadFailed,
    TooLarge,
    SendFailed,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::DownloadFailed => write!(f, "download failed"),
            FallbackReason::TooLarge => write!(f, "file too large"),
            FallbackReason::SendFailed => write!(f, "send failed"),
        }
    }
}

/// Result of one single-item upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Delivered { kind: MediaKind, as_document: bool },
    FallbackSent { reason: FallbackReason },
}

impl UploadOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, UploadOutcome::Delivered { .. })
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Delivered { kind, as_document: true } => {
                write!(f, "{} delivered as document", kind)
            }
            UploadOutcome::Delivered { kind, .. } => write!(f, "{} delivered", kind),
            UploadOutcome::FallbackSent { reason } => write!(f, "links sent instead ({})", reason),
        }
    }
}

/// Counters for one album delivery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumReport {
    pub requested: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub groups_sent: usize,
    pub groups_failed: usize,
    pub singles_sent: usize,
    pub singles_failed: usize,
}

impl AlbumReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    pub fn had_failures(&self) -> bool {
        self.skipped > 0 || self.groups_failed > 0 || self.singles_failed > 0
    }

    pub fn log_summary(&self) {
        if self.had_failures() {
            log::warn!(
                "Album finished with failures: {}/{} downloaded, {} group(s) sent, {} group(s) failed, {} single(s) sent, {} single(s) failed",
                self.downloaded,
                self.requested,
                self.groups_sent,
                self.groups_failed,
                self.singles_sent,
                self.singles_failed
            );
        } else {
            log::info!(
                "Album delivered: {} item(s) in {} group(s) and {} single(s)",
                self.downloaded,
                self.groups_sent,
                self.singles_sent
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        let delivered = UploadOutcome::Delivered {
            kind: MediaKind::Photo,
            as_document: true,
        };
        assert!(delivered.is_delivered());
        assert_eq!(delivered.to_string(), "photo delivered as document");

        let fallback = UploadOutcome::FallbackSent {
            reason: FallbackReason::TooLarge,
        };
        assert!(!fallback.is_delivered());
        assert_eq!(fallback.to_string(), "links sent instead (file too large)");
    }

    #[test]
    fn test_album_report_failures() {
        let mut report = AlbumReport::new(3);
        report.downloaded = 3;
        report.groups_sent = 1;
        assert!(!report.had_failures());

        report.skipped = 1;
        assert!(report.had_failures());
    }
}
