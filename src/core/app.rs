//! Runtime state for one chat session.
//!
//! [`App`] owns the transcript and the session selections, and implements the
//! send pipeline's state transitions. It performs no I/O: the chat loop feeds
//! it user input and backend outcomes, and the renderer reads it.

use std::collections::VecDeque;

use crate::api::client::{ChatOutcome, UploadedImage};
use crate::api::ChatRequest;
use crate::core::indicator::{route_status, RouteStatus};
use crate::core::message::Message;
use crate::core::providers::{self, AUTO_ROUTE};
use crate::core::session::{PendingAttachment, SessionState};
use crate::core::tokens::TokenUsage;
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;

pub const WELCOME_TEXT: &str =
    "Hi! I'm your NeuroSwitch assistant. Ask me anything, attach an image with \
     /attach, or pick a response mode with /mode.";

pub struct App {
    pub messages: VecDeque<Message>,
    pub session: SessionState,
    pub route: RouteStatus,
    /// Current contents of the input area.
    pub input: String,
    /// Welcome banner and command suggestions, shown until the first send and
    /// restored by a conversation reset.
    pub show_welcome: bool,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    /// UI frame counter; drives the pending-entry ellipsis animation.
    pub tick: u64,
    pub theme: Theme,
    pub markdown_enabled: bool,
    pub syntax_enabled: bool,
    pub logging: LoggingState,
    reset_done: bool,
}

impl App {
    pub fn new(provider: impl Into<String>) -> Self {
        let session = SessionState::new(provider);
        let route = route_status(providers::is_auto_route(&session.provider), false, None);
        let mut messages = VecDeque::new();
        messages.push_back(Message::app_info(WELCOME_TEXT));
        App {
            messages,
            session,
            route,
            input: String::new(),
            show_welcome: true,
            scroll_offset: 0,
            auto_scroll: true,
            tick: 0,
            theme: Theme::dark_default(),
            markdown_enabled: true,
            syntax_enabled: true,
            logging: LoggingState::new(None),
            reset_done: false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }

    /// Remove the oldest pending entry, returning it so the caller can reuse
    /// the provider recorded at send time.
    fn remove_pending(&mut self) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.pending)?;
        self.messages.remove(index)
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push_back(message);
        self.auto_scroll = true;
    }

    /// Start a send: record the user entry, capture and clear the per-send
    /// selections, and show the pending placeholder. Returns the request to
    /// issue, or `None` when there is nothing to send.
    pub fn begin_send(&mut self, input_text: &str) -> Option<ChatRequest> {
        let text = input_text.trim();
        if text.is_empty() && self.session.attachment.is_none() {
            return None;
        }

        self.show_welcome = false;
        self.append_message(Message::user(text));

        let attachment = self.session.attachment.take();
        let mode = self.session.mode.take();

        self.append_message(Message::pending(self.session.provider.clone()));

        Some(ChatRequest {
            message: text.to_string(),
            image: attachment.map(|a| a.data),
            mode,
        })
    }

    /// Finish a send: replace the pending placeholder with the final entry,
    /// attributed to the server-reported provider when present, and fold the
    /// response metadata into session state. Runs identically for success and
    /// synthesized-error outcomes, so no path leaves a placeholder behind.
    pub fn complete_send(&mut self, outcome: ChatOutcome) {
        let send_time_provider = self.remove_pending().and_then(|m| m.provider);
        let provider = outcome.provider_used.or(send_time_provider);

        self.append_message(Message::assistant(
            outcome.response,
            provider,
            outcome.tool_name,
        ));

        if let Some(usage) = outcome.token_usage {
            self.session.token_usage = TokenUsage::from_wire(&usage);
        }

        self.route = route_status(
            providers::is_auto_route(&self.session.provider),
            outcome.neuroswitch_active,
            outcome.fallback_reason.as_deref(),
        );
    }

    pub fn select_provider(&mut self, provider: &str) {
        self.session.provider = provider.to_string();
        // No routing outcome yet for the new selection.
        self.route = route_status(providers::is_auto_route(provider), false, None);
    }

    pub fn upload_succeeded(&mut self, image: UploadedImage) {
        self.session
            .set_attachment(PendingAttachment::from_upload(image));
    }

    pub fn upload_failed(&mut self, detail: &str) {
        self.append_message(Message::app_error(format!("Image upload failed: {detail}")));
    }

    /// Clear all transient state back to the welcome screen. Guarded so a
    /// duplicate invocation within one process lifetime is a no-op; returns
    /// whether the reset actually ran (and hence whether the server-side
    /// reset call should be issued).
    pub fn reset_conversation(&mut self) -> bool {
        if self.reset_done {
            return false;
        }
        self.reset_done = true;

        self.messages.truncate(1); // keep the welcome entry
        self.input.clear();
        self.session.clear_attachment();
        self.session.clear_mode();
        self.session.token_usage = TokenUsage::default();
        self.show_welcome = true;
        self.scroll_offset = 0;
        self.auto_scroll = true;
        self.route = route_status(
            providers::is_auto_route(&self.session.provider),
            false,
            None,
        );
        true
    }
}

impl Default for App {
    fn default() -> Self {
        App::new(AUTO_ROUTE)
    }
}
