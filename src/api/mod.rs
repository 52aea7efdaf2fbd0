use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub image: Option<String>,
    pub mode: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct TokenUsageWire {
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub max_tokens: Option<u64>,
}

/// Body of a `/chat` response. Every field is optional on the wire; the
/// client substitutes defaults rather than rejecting partial payloads.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ChatResponseBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub provider_used: Option<String>,
    #[serde(default)]
    pub neuroswitch_active: bool,
    #[serde(default)]
    pub fallback_reason: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub token_usage: Option<TokenUsageWire>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SetProviderRequest {
    pub provider: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SetProviderResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

pub mod client;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_response_tolerates_missing_fields() {
        let body: ChatResponseBody = serde_json::from_str("{}").unwrap();
        assert!(body.response.is_none());
        assert!(!body.neuroswitch_active);
        assert!(body.token_usage.is_none());
    }

    #[test]
    fn chat_response_parses_full_payload() {
        let body: ChatResponseBody = serde_json::from_str(
            r#"{
                "response": "Hi!",
                "provider_used": "claude",
                "neuroswitch_active": true,
                "fallback_reason": null,
                "tool_name": "filecreator",
                "token_usage": {"total_tokens": 1200, "max_tokens": 200000}
            }"#,
        )
        .unwrap();
        assert_eq!(body.response.as_deref(), Some("Hi!"));
        assert_eq!(body.provider_used.as_deref(), Some("claude"));
        assert!(body.neuroswitch_active);
        assert_eq!(body.tool_name.as_deref(), Some("filecreator"));
        let usage = body.token_usage.unwrap();
        assert_eq!(usage.total_tokens, Some(1200));
        assert_eq!(usage.max_tokens, Some(200_000));
    }

    #[test]
    fn upload_failure_carries_error_text() {
        let body: UploadResponse =
            serde_json::from_str(r#"{"success": false, "error": "Invalid file type"}"#).unwrap();
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Invalid file type"));
    }

    #[test]
    fn chat_request_serializes_null_image_and_mode() {
        let req = ChatRequest {
            message: "hello".into(),
            image: None,
            mode: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["image"].is_null());
        assert!(json["mode"].is_null());
    }
}
