#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
    AppInfo,
    AppWarning,
    AppError,
}

impl Sender {
    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    pub fn is_assistant(self) -> bool {
        self == Sender::Assistant
    }

    pub fn is_app(self) -> bool {
        matches!(self, Sender::AppInfo | Sender::AppWarning | Sender::AppError)
    }
}

/// One transcript entry. Entries are replaced, never edited in place: the
/// pending placeholder is removed and a final entry appended when the reply
/// arrives.
#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    /// Provider this entry is attributed to (assistant entries only).
    pub provider: Option<String>,
    /// Tool the server reports it used while producing this reply.
    pub tool_name: Option<String>,
    /// Placeholder shown while a reply is in flight.
    pub pending: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            sender: Sender::User,
            content: content.into(),
            provider: None,
            tool_name: None,
            pending: false,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        provider: Option<String>,
        tool_name: Option<String>,
    ) -> Self {
        Message {
            sender: Sender::Assistant,
            content: content.into(),
            provider,
            tool_name,
            pending: false,
        }
    }

    /// Placeholder entry tagged with the provider selected at send time, so
    /// the avatar matches what the user expects while the reply is pending.
    pub fn pending(provider: impl Into<String>) -> Self {
        Message {
            sender: Sender::Assistant,
            content: String::new(),
            provider: Some(provider.into()),
            tool_name: None,
            pending: true,
        }
    }

    pub fn app_info(content: impl Into<String>) -> Self {
        Message {
            sender: Sender::AppInfo,
            content: content.into(),
            provider: None,
            tool_name: None,
            pending: false,
        }
    }

    pub fn app_warning(content: impl Into<String>) -> Self {
        Message {
            sender: Sender::AppWarning,
            content: content.into(),
            provider: None,
            tool_name: None,
            pending: false,
        }
    }

    pub fn app_error(content: impl Into<String>) -> Self {
        Message {
            sender: Sender::AppError,
            content: content.into(),
            provider: None,
            tool_name: None,
            pending: false,
        }
    }
}
