//! Per-session selections the send pipeline reads at submission time.

use crate::api::client::UploadedImage;
use crate::core::providers::AUTO_ROUTE;
use crate::core::tokens::TokenUsage;

/// Response modes the backend understands. Selecting one injects the matching
/// system prompt server-side for the next message only.
pub const MODES: &[&str] = &["deep_research", "think", "write_code", "image"];

/// Image waiting to ride along with the next message. At most one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    /// Base64 payload as returned by the upload endpoint.
    pub data: String,
    pub media_type: String,
    pub file_name: String,
}

impl PendingAttachment {
    pub fn from_upload(image: UploadedImage) -> Self {
        PendingAttachment {
            data: image.data,
            media_type: image.media_type,
            file_name: image.file_name,
        }
    }

    /// Approximate decoded size, for the preview line.
    pub fn decoded_len(&self) -> usize {
        base64::decoded_len_estimate(self.data.len())
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    /// Active provider id, or [`AUTO_ROUTE`].
    pub provider: String,
    /// Mode tag for the next send, cleared after each send.
    pub mode: Option<String>,
    pub attachment: Option<PendingAttachment>,
    pub token_usage: TokenUsage,
}

impl SessionState {
    pub fn new(provider: impl Into<String>) -> Self {
        let provider = provider.into();
        let provider = if provider.is_empty() {
            AUTO_ROUTE.to_string()
        } else {
            provider
        };
        SessionState {
            provider,
            mode: None,
            attachment: None,
            token_usage: TokenUsage::default(),
        }
    }

    pub fn select_mode(&mut self, mode: &str) -> Result<(), String> {
        let normalized = mode.trim().to_ascii_lowercase();
        if !MODES.contains(&normalized.as_str()) {
            return Err(format!(
                "unknown mode '{mode}' (available: {})",
                MODES.join(", ")
            ));
        }
        self.mode = Some(normalized);
        Ok(())
    }

    pub fn clear_mode(&mut self) {
        self.mode = None;
    }

    pub fn set_attachment(&mut self, attachment: PendingAttachment) {
        self.attachment = Some(attachment);
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_provider_defaults_to_auto_route() {
        let session = SessionState::new("");
        assert_eq!(session.provider, AUTO_ROUTE);
    }

    #[test]
    fn mode_selection_validates_and_normalizes() {
        let mut session = SessionState::new(AUTO_ROUTE);
        session.select_mode("Think").unwrap();
        assert_eq!(session.mode.as_deref(), Some("think"));
        assert!(session.select_mode("daydream").is_err());
        // A rejected selection leaves the previous mode in place.
        assert_eq!(session.mode.as_deref(), Some("think"));
    }

    #[test]
    fn attachment_is_replaced_not_accumulated() {
        let mut session = SessionState::new(AUTO_ROUTE);
        session.set_attachment(PendingAttachment {
            data: "aGVsbG8=".into(),
            media_type: "image/png".into(),
            file_name: "a.png".into(),
        });
        session.set_attachment(PendingAttachment {
            data: "d29ybGQ=".into(),
            media_type: "image/jpeg".into(),
            file_name: "b.jpg".into(),
        });
        assert_eq!(session.attachment.as_ref().unwrap().file_name, "b.jpg");
        session.clear_attachment();
        assert!(session.attachment.is_none());
    }

    #[test]
    fn decoded_len_estimates_payload_size() {
        let attachment = PendingAttachment {
            data: "aGVsbG8=".into(), // "hello"
            media_type: "image/png".into(),
            file_name: "a.png".into(),
        };
        assert!(attachment.decoded_len() >= 5);
    }
}
