use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::media::ChatId;
use crate::security::InputValidator;

use super::transport::{ChatActivity, SendUnit, Transport};

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client. One HTTP request per call, no retries.
pub struct TelegramClient {
    client: Client,
    api_base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_base_url: &str, token: &str, timeout: Duration) -> AppResult<Self> {
        InputValidator::validate_bot_token(token)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.token, method)
    }

    async fn post_json(&self, method: &str, body: serde_json::Value) -> AppResult<()> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(redact_url)?;
        check_response(method, response).await
    }

    async fn post_form(&self, method: &str, payload: &UploadPayload) -> AppResult<()> {
        let form = payload.build_form()?;
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(redact_url)?;
        check_response(method, response).await
    }

    async fn send_file(
        &self,
        method: &str,
        field_name: &str,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()> {
        let mut payload = UploadPayload::new();
        payload.add_text_field("chat_id".to_string(), chat.to_string());
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            payload.add_text_field("caption".to_string(), InputValidator::truncate_caption(caption));
        }
        payload.add_file(path, field_name.to_string()).await?;

        if let Some(thumbnail) = thumbnail {
            payload.add_file(thumbnail, "thumbnail_file".to_string()).await?;
            payload.add_text_field("thumbnail".to_string(), "attach://thumbnail_file".to_string());
        }

        log::debug!("Calling {} for chat {} with {}", method, chat, path.display());
        self.post_form(method, &payload).await
    }
}

/// Request URLs embed the bot token, so they never travel inside an error
fn redact_url(error: reqwest::Error) -> AppError {
    AppError::Network(error.without_url())
}

async fn check_response(method: &str, response: reqwest::Response) -> AppResult<()> {
    let status = response.status();
    let body = response.text().await.map_err(redact_url)?;

    let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();
    match parsed {
        Some(api) if status.is_success() && api.ok => Ok(()),
        Some(api) => Err(AppError::TelegramApi {
            method: method.to_string(),
            code: api.error_code.unwrap_or(status.as_u16() as i64),
            description: api
                .description
                .unwrap_or_else(|| "Unknown error".to_string()),
        }),
        None => Err(AppError::TelegramApi {
            method: method.to_string(),
            code: status.as_u16() as i64,
            description: format!(
                "Unparsable response: {}",
                body.chars().take(200).collect::<String>()
            ),
        }),
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> AppResult<()> {
        self.post_json(
            "sendMessage",
            serde_json::json!({ "chat_id": chat.0, "text": text }),
        )
        .await
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()> {
        if thumbnail.is_some() {
            log::debug!("Photos carry no thumbnail; ignoring it for chat {}", chat);
        }
        self.send_file("sendPhoto", "photo", chat, path, caption, None)
            .await
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()> {
        self.send_file("sendDocument", "document", chat, path, caption, thumbnail)
            .await
    }

    async fn send_animation(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()> {
        self.send_file("sendAnimation", "animation", chat, path, caption, thumbnail)
            .await
    }

    async fn send_video(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
        thumbnail: Option<&Path>,
    ) -> AppResult<()> {
        self.send_file("sendVideo", "video", chat, path, caption, thumbnail)
            .await
    }

    async fn send_group(&self, chat: ChatId, units: &[SendUnit]) -> AppResult<()> {
        let mut payload = UploadPayload::new();
        payload.add_text_field("chat_id".to_string(), chat.to_string());

        let mut media = Vec::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            let attach_name = format!("file{}", i);
            payload.add_file(unit.path(), attach_name.clone()).await?;
            media.push(media_group_entry(unit, &attach_name));
        }
        payload.add_text_field("media".to_string(), serde_json::to_string(&media)?);

        log::debug!("Calling sendMediaGroup for chat {} with {} item(s)", chat, units.len());
        self.post_form("sendMediaGroup", &payload).await
    }

    async fn send_activity(&self, chat: ChatId, activity: ChatActivity) -> AppResult<()> {
        self.post_json(
            "sendChatAction",
            serde_json::json!({ "chat_id": chat.0, "action": activity.as_str() }),
        )
        .await
    }
}

/// JSON description of one album element, pointing at its multipart part
fn media_group_entry(unit: &SendUnit, attach_name: &str) -> serde_json::Value {
    let media_type = match unit {
        SendUnit::Photo { .. } => "photo",
        SendUnit::Video { .. } => "video",
    };
    let mut entry = serde_json::json!({
        "type": media_type,
        "media": format!("attach://{}", attach_name),
    });
    if let Some(caption) = unit.caption().filter(|c| !c.is_empty()) {
        entry["caption"] = serde_json::Value::String(InputValidator::truncate_caption(caption));
    }
    entry
}

/// Helper struct to hold multipart payload data
#[derive(Debug, Clone)]
pub struct UploadPayload {
    files: Vec<(String, Vec<u8>, String, String)>, // (filename, data, mime_type, field_name)
    text_fields: HashMap<String, String>,
}

impl UploadPayload {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            text_fields: HashMap::new(),
        }
    }

    pub fn add_text_field(&mut self, key: String, value: String) {
        self.text_fields.insert(key, value);
    }

    pub async fn add_file(&mut self, file_path: &Path, field_name: String) -> AppResult<()> {
        let file_contents = tokio::fs::read(file_path).await?;
        let filename = file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        self.files.push((
            filename,
            file_contents,
            mime_for_path(file_path).to_string(),
            field_name,
        ));
        Ok(())
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.text_fields.get(key).map(String::as_str)
    }

    pub fn build_form(&self) -> AppResult<multipart::Form> {
        let mut form = multipart::Form::new();

        for (key, value) in &self.text_fields {
            form = form.text(key.clone(), value.clone());
        }

        for (filename, data, mime_type, field_name) in &self.files {
            let part = multipart::Part::bytes(data.clone())
                .file_name(filename.clone())
                .mime_str(mime_type)?;

            form = form.part(field_name.clone(), part);
        }

        Ok(form)
    }
}

impl Default for UploadPayload {
    fn default() -> Self {
        Self::new()
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn token() -> String {
        format!("123456789:{}", "a".repeat(35))
    }

    #[test]
    fn test_rejects_malformed_token() {
        let result = TelegramClient::new("https://api.telegram.org", "nope", Duration::from_secs(5));
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_method_url() {
        let client =
            TelegramClient::new("https://api.telegram.org/", &token(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.method_url("sendPhoto"),
            format!("https://api.telegram.org/bot{}/sendPhoto", token())
        );
    }

    #[tokio::test]
    async fn test_network_errors_do_not_expose_token() {
        let token = format!("123456789:{}", "S".repeat(35));
        let client = TelegramClient::new("http://127.0.0.1:1", &token, Duration::from_secs(2)).unwrap();

        let err = client.send_group(ChatId(1), &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
        let text = format!("{} {:?}", err, err);
        assert!(!text.contains(&token), "token leaked: {}", text);

        let err = client.send_activity(ChatId(1), ChatActivity::UploadPhoto).await.unwrap_err();
        assert!(!err.to_string().contains(&token));
    }

    #[test]
    fn test_media_group_entry() {
        let unit = SendUnit::Video {
            path: PathBuf::from("/tmp/a.mp4"),
            caption: Some("clip".to_string()),
        };
        let entry = media_group_entry(&unit, "file3");
        assert_eq!(entry["type"], "video");
        assert_eq!(entry["media"], "attach://file3");
        assert_eq!(entry["caption"], "clip");

        let unit = SendUnit::Photo {
            path: PathBuf::from("/tmp/a.jpg"),
            caption: None,
        };
        let entry = media_group_entry(&unit, "file0");
        assert_eq!(entry["type"], "photo");
        assert!(entry.get("caption").is_none());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.mp4")), "video/mp4");
        assert_eq!(mime_for_path(Path::new("a")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_payload_collects_files_and_fields() {
        let path = std::env::temp_dir().join(format!("payload_test_{}.png", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"png-bytes").unwrap();

        let mut payload = UploadPayload::new();
        payload.add_text_field("chat_id".to_string(), "42".to_string());
        payload.add_file(&path, "photo".to_string()).await.unwrap();

        assert_eq!(payload.file_count(), 1);
        assert_eq!(payload.text_field("chat_id"), Some("42"));
        assert!(payload.build_form().is_ok());

        let _ = std::fs::remove_file(&path);
    }
}
