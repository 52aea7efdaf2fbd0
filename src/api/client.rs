//! HTTP shim for the four backend endpoints.
//!
//! The chat path is deliberately infallible from the caller's point of view:
//! transport and decode failures are folded into a [`ChatOutcome`] that reads
//! like an ordinary (error-text) reply, so the UI never has to unwind a send.

use std::error::Error;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use tracing::{debug, warn};

use crate::api::{
    ChatRequest, ChatResponseBody, SetProviderRequest, SetProviderResponse, TokenUsageWire,
    UploadResponse,
};

/// File extensions the backend's upload endpoint accepts.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Normalized result of one `/chat` round trip.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: String,
    pub provider_used: Option<String>,
    pub neuroswitch_active: bool,
    pub fallback_reason: Option<String>,
    pub tool_name: Option<String>,
    pub token_usage: Option<TokenUsageWire>,
}

impl ChatOutcome {
    pub fn from_body(status_ok: bool, body: ChatResponseBody) -> Self {
        let response = match body.response {
            Some(text) if !text.is_empty() => text,
            _ if status_ok => "[No response text]".to_string(),
            _ => "Error retrieving response".to_string(),
        };
        ChatOutcome {
            response,
            provider_used: body.provider_used.filter(|p| !p.is_empty()),
            neuroswitch_active: body.neuroswitch_active,
            fallback_reason: body.fallback_reason.filter(|r| !r.is_empty()),
            tool_name: body.tool_name.filter(|t| !t.is_empty()),
            token_usage: body.token_usage,
        }
    }

    /// Response arrived but the body was not decodable JSON.
    pub fn invalid_body(status: u16) -> Self {
        ChatOutcome {
            response: format!("Server error ({status}). Could not parse response."),
            provider_used: None,
            neuroswitch_active: false,
            fallback_reason: Some("Invalid server response".to_string()),
            tool_name: None,
            token_usage: None,
        }
    }

    /// The request never produced a response at all.
    pub fn network_failure(detail: &str) -> Self {
        ChatOutcome {
            response: format!("Error sending message: {detail}"),
            provider_used: None,
            neuroswitch_active: false,
            fallback_reason: Some("Network Error".to_string()),
            tool_name: None,
            token_usage: None,
        }
    }
}

/// An image accepted by the upload endpoint, held client-side until the next
/// send attaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Base64 payload exactly as returned by the server.
    pub data: String,
    pub media_type: String,
    pub file_name: String,
}

#[derive(Debug)]
pub enum UploadError {
    UnsupportedType(String),
    Io(std::io::Error),
    Http(reqwest::Error),
    Rejected(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::UnsupportedType(ext) => {
                if ext.is_empty() {
                    write!(f, "file has no extension (supported: png, jpg, jpeg, gif, webp)")
                } else {
                    write!(f, "unsupported file type '{ext}' (supported: png, jpg, jpeg, gif, webp)")
                }
            }
            UploadError::Io(err) => write!(f, "could not read file: {err}"),
            UploadError::Http(err) => write!(f, "upload request failed: {err}"),
            UploadError::Rejected(msg) => write!(f, "server rejected upload: {msg}"),
        }
    }
}

impl Error for UploadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UploadError::Io(err) => Some(err),
            UploadError::Http(err) => Some(err),
            _ => None,
        }
    }
}

/// The four operations the chat loop needs from the backend. Tests substitute
/// a scripted implementation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_chat(&self, request: ChatRequest) -> ChatOutcome;
    async fn upload(&self, path: &Path) -> Result<UploadedImage, UploadError>;
    async fn set_provider(&self, provider: &str) -> Result<(), String>;
    async fn reset(&self) -> Result<(), String>;
}

pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        BackendClient {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[async_trait]
impl ChatBackend for BackendClient {
    async fn send_chat(&self, request: ChatRequest) -> ChatOutcome {
        debug!(mode = ?request.mode, has_image = request.image.is_some(), "sending chat request");
        match self
            .client
            .post(self.endpoint("/chat"))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                match response.json::<ChatResponseBody>().await {
                    Ok(body) => ChatOutcome::from_body(status.is_success(), body),
                    Err(err) => {
                        warn!(error = %err, status = status.as_u16(), "chat response was not valid JSON");
                        ChatOutcome::invalid_body(status.as_u16())
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "chat request failed");
                ChatOutcome::network_failure(&err.to_string())
            }
        }
    }

    async fn upload(&self, path: &Path) -> Result<UploadedImage, UploadError> {
        let ext = extension_of(path);
        if !SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(UploadError::UnsupportedType(ext));
        }

        let bytes = tokio::fs::read(path).await.map_err(UploadError::Io)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let mut part = multipart::Part::bytes(bytes).file_name(file_name.clone());
        if let Some(mime) = mime_for_extension(&ext) {
            part = part.mime_str(mime).map_err(UploadError::Http)?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(UploadError::Http)?;
        let body: UploadResponse = response.json().await.map_err(UploadError::Http)?;

        if !body.success {
            return Err(UploadError::Rejected(
                body.error.unwrap_or_else(|| "upload failed".to_string()),
            ));
        }
        match (body.image_data, body.media_type) {
            (Some(data), Some(media_type)) => Ok(UploadedImage {
                data,
                media_type,
                file_name,
            }),
            _ => Err(UploadError::Rejected(
                "response was missing image data".to_string(),
            )),
        }
    }

    async fn set_provider(&self, provider: &str) -> Result<(), String> {
        let response = self
            .client
            .post(self.endpoint("/set_provider"))
            .json(&SetProviderRequest {
                provider: provider.to_string(),
            })
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let body: SetProviderResponse = response.json().await.map_err(|e| e.to_string())?;
        if body.status == "success" {
            Ok(())
        } else {
            Err(body
                .message
                .unwrap_or_else(|| "server rejected the provider".to_string()))
        }
    }

    async fn reset(&self) -> Result<(), String> {
        let response = self
            .client
            .post(self.endpoint("/reset"))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("reset returned {}", response.status()))
        }
    }
}
