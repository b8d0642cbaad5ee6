// User-facing texts sent when binary delivery cannot complete

use super::outcome::FallbackReason;

/// URLs to hand out instead of the file itself
#[derive(Debug, Clone, Copy)]
pub enum FallbackLinks<'a> {
    File(&'a str),
    Image(&'a str),
    Video {
        video_url: &'a str,
        audio_url: Option<&'a str>,
    },
}

fn reason_line(reason: FallbackReason, links: &FallbackLinks<'_>) -> &'static str {
    match reason {
        FallbackReason::DownloadFailed if matches!(links, FallbackLinks::Video { .. }) => {
            "Can't download file."
        }
        FallbackReason::DownloadFailed => "Cannot download file.",
        FallbackReason::TooLarge => "This file is too big to upload it on Telegram!",
        FallbackReason::SendFailed => "Cannot upload file.",
    }
}

/// Link lines for a video, with the audio track on its own line when it is
/// served separately
pub fn video_urls_message(video_url: &str, audio_url: Option<&str>) -> String {
    let mut message = String::with_capacity(150);
    message.push_str("Here is the link to video file: ");
    message.push_str(video_url);
    if let Some(audio_url) = audio_url.filter(|u| !u.is_empty()) {
        message.push_str("\nHere is the link to audio file: ");
        message.push_str(audio_url);
    }
    message
}

pub fn fallback_message(reason: FallbackReason, links: FallbackLinks<'_>) -> String {
    let reason_line = reason_line(reason, &links);
    let links = match links {
        FallbackLinks::File(url) => format!("Here is the link to file: {}", url),
        // Nothing was fetched yet, so it is not known to be an image
        FallbackLinks::Image(url) if reason == FallbackReason::DownloadFailed => {
            format!("Here is the link to file: {}", url)
        }
        FallbackLinks::Image(url) => format!("Here is the link to image: {}", url),
        FallbackLinks::Video {
            video_url,
            audio_url,
        } => video_urls_message(video_url, audio_url),
    };
    format!("{}\n{}", reason_line, links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_lines(message: &str) -> Vec<&str> {
        message.lines().filter(|l| l.contains("https://")).collect()
    }

    #[test]
    fn test_file_fallback() {
        let message = fallback_message(
            FallbackReason::TooLarge,
            FallbackLinks::File("https://i.redd.it/a.jpg"),
        );
        assert_eq!(
            message,
            "This file is too big to upload it on Telegram!\nHere is the link to file: https://i.redd.it/a.jpg"
        );
    }

    #[test]
    fn test_image_fallback_wording() {
        let url = "https://i.redd.it/a.jpg";
        assert_eq!(
            fallback_message(FallbackReason::TooLarge, FallbackLinks::Image(url)),
            "This file is too big to upload it on Telegram!\nHere is the link to image: https://i.redd.it/a.jpg"
        );
        assert_eq!(
            fallback_message(FallbackReason::SendFailed, FallbackLinks::Image(url)),
            "Cannot upload file.\nHere is the link to image: https://i.redd.it/a.jpg"
        );
        assert_eq!(
            fallback_message(FallbackReason::DownloadFailed, FallbackLinks::Image(url)),
            "Cannot download file.\nHere is the link to file: https://i.redd.it/a.jpg"
        );
    }

    #[test]
    fn test_video_download_failure_wording() {
        let message = fallback_message(
            FallbackReason::DownloadFailed,
            FallbackLinks::Video {
                video_url: "https://v.redd.it/x/DASH_720.mp4",
                audio_url: None,
            },
        );
        assert_eq!(
            message,
            "Can't download file.\nHere is the link to video file: https://v.redd.it/x/DASH_720.mp4"
        );
    }

    #[test]
    fn test_video_without_audio_has_one_url_line() {
        let message = fallback_message(
            FallbackReason::SendFailed,
            FallbackLinks::Video {
                video_url: "https://v.redd.it/x/DASH_720.mp4",
                audio_url: None,
            },
        );
        assert_eq!(url_lines(&message), vec!["Here is the link to video file: https://v.redd.it/x/DASH_720.mp4"]);
        assert!(message.starts_with("Cannot upload file.\n"));
    }

    #[test]
    fn test_video_with_audio_has_two_url_lines_in_order() {
        let message = fallback_message(
            FallbackReason::DownloadFailed,
            FallbackLinks::Video {
                video_url: "https://v.redd.it/x/DASH_720.mp4",
                audio_url: Some("https://v.redd.it/x/DASH_audio.mp4"),
            },
        );
        let lines = url_lines(&message);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("DASH_720"));
        assert!(lines[1].contains("DASH_audio"));
    }

    #[test]
    fn test_empty_audio_url_is_ignored() {
        assert_eq!(
            video_urls_message("https://v/x.mp4", Some("")),
            "Here is the link to video file: https://v/x.mp4"
        );
    }
}
