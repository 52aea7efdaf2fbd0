//! Interactive chat session: terminal setup, the event loop, and the wiring
//! between user actions, the backend client, and app state.
//!
//! Each user-triggered action (send, upload, provider change) spawns one task
//! that owns its HTTP request and reports back over the event channel.
//! Overlapping sends are allowed; each outcome resolves the oldest pending
//! entry independently.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::api::client::{BackendClient, ChatBackend, ChatOutcome, UploadedImage};
use crate::commands::{self, CommandResult};
use crate::core::app::App;
use crate::core::message::Message;
use crate::core::providers;
use crate::ui::renderer::{max_scroll_offset, ui};
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;

pub struct RunOptions {
    pub server_url: String,
    pub provider: String,
    pub theme: Theme,
    pub markdown_enabled: bool,
    pub syntax_enabled: bool,
    pub log_file: Option<String>,
}

#[derive(Debug)]
pub enum UiEvent {
    ChatCompleted(ChatOutcome),
    UploadCompleted {
        result: Result<UploadedImage, String>,
    },
    ProviderUpdated {
        provider: String,
        result: Result<(), String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Quit,
}

pub async fn run_chat(options: RunOptions) -> Result<(), Box<dyn Error>> {
    let backend: Arc<dyn ChatBackend> = Arc::new(BackendClient::new(&options.server_url));
    info!(server = %options.server_url, provider = %options.provider, "starting chat session");
    run_chat_with_backend(options, backend).await
}

async fn run_chat_with_backend(
    options: RunOptions,
    backend: Arc<dyn ChatBackend>,
) -> Result<(), Box<dyn Error>> {
    let mut app = App::new(options.provider);
    app.theme = options.theme;
    app.markdown_enabled = options.markdown_enabled;
    app.syntax_enabled = options.syntax_enabled;
    app.logging = LoggingState::new(options.log_file);

    initial_reset(&mut app, &backend).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    let backend_impl = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_impl)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<UiEvent>();
    let result = run_event_loop(&mut terminal, &mut app, &backend, &tx, &mut rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Server-side conversation reset, issued once per process start. The state
/// clear is guarded inside [`App::reset_conversation`]; a duplicate call does
/// nothing and skips the network round trip too.
async fn initial_reset(app: &mut App, backend: &Arc<dyn ChatBackend>) {
    if !app.reset_conversation() {
        return;
    }
    if let Err(err) = backend.reset().await {
        // Non-fatal: the session still works, history just may carry over.
        warn!(error = %err, "conversation reset request failed");
    }
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: &Arc<dyn ChatBackend>,
    tx: &UnboundedSender<UiEvent>,
    rx: &mut UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            let viewport = chat_viewport_height(terminal.size().unwrap_or_default().height, app);
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(app, backend, tx, key, viewport) == LoopControl::Quit {
                        break;
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => scroll_up(app, 3, viewport),
                    MouseEventKind::ScrollDown => scroll_down(app, 3, viewport),
                    _ => {}
                },
                Event::Paste(text) => app.input.push_str(&text),
                _ => {}
            }
        }

        app.tick = app.tick.wrapping_add(1);
        while let Ok(ev) = rx.try_recv() {
            apply_ui_event(app, ev);
        }
    }
    Ok(())
}

/// Transcript rows visible once the chrome (title, gauge, input, status,
/// attachment preview) is accounted for.
fn chat_viewport_height(terminal_height: u16, app: &App) -> u16 {
    let input_rows = (app.input.split('\n').count().min(6) as u16) + 2;
    let attachment_rows = if app.session.attachment.is_some() { 1 } else { 0 };
    terminal_height
        .saturating_sub(1) // title
        .saturating_sub(1) // token gauge
        .saturating_sub(input_rows)
        .saturating_sub(1) // status bar
        .saturating_sub(attachment_rows)
}

fn scroll_up(app: &mut App, amount: u16, viewport: u16) {
    let max = max_scroll_offset(app, viewport);
    if app.auto_scroll {
        app.scroll_offset = max;
    }
    app.auto_scroll = false;
    app.scroll_offset = app.scroll_offset.min(max).saturating_sub(amount);
}

fn scroll_down(app: &mut App, amount: u16, viewport: u16) {
    let max = max_scroll_offset(app, viewport);
    app.scroll_offset = app.scroll_offset.saturating_add(amount).min(max);
    if app.scroll_offset >= max {
        app.auto_scroll = true;
    }
}

fn handle_key(
    app: &mut App,
    backend: &Arc<dyn ChatBackend>,
    tx: &UnboundedSender<UiEvent>,
    key: KeyEvent,
    viewport: u16,
) -> LoopControl {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return LoopControl::Quit;
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.input.push('\n');
        }
        // Plain Enter sends; Ctrl+Enter sends too.
        KeyCode::Enter => handle_submit(app, backend, tx),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Up => scroll_up(app, 1, viewport),
        KeyCode::Down => scroll_down(app, 1, viewport),
        KeyCode::PageUp => scroll_up(app, 10, viewport),
        KeyCode::PageDown => scroll_down(app, 10, viewport),
        _ => {}
    }
    LoopControl::Continue
}

fn handle_submit(app: &mut App, backend: &Arc<dyn ChatBackend>, tx: &UnboundedSender<UiEvent>) {
    let input = std::mem::take(&mut app.input);
    match commands::process_input(app, &input) {
        CommandResult::Continue => {}
        CommandResult::Attach(path) => spawn_upload(backend, tx, path),
        CommandResult::SetProvider(provider) => spawn_provider_push(backend, tx, provider),
        CommandResult::ProcessAsMessage(text) => {
            let Some(request) = app.begin_send(&text) else {
                return;
            };
            if let Some(entry) = app.messages.iter().rev().find(|m| m.sender.is_user()) {
                if let Err(err) = app.logging.log_entry(entry) {
                    warn!(error = %err, "could not log user entry");
                }
            }
            let backend = Arc::clone(backend);
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = backend.send_chat(request).await;
                let _ = tx.send(UiEvent::ChatCompleted(outcome));
            });
        }
    }
}

fn spawn_upload(backend: &Arc<dyn ChatBackend>, tx: &UnboundedSender<UiEvent>, path: PathBuf) {
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = backend.upload(&path).await.map_err(|e| e.to_string());
        let _ = tx.send(UiEvent::UploadCompleted { result });
    });
}

fn spawn_provider_push(
    backend: &Arc<dyn ChatBackend>,
    tx: &UnboundedSender<UiEvent>,
    provider: String,
) {
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = backend.set_provider(&provider).await;
        let _ = tx.send(UiEvent::ProviderUpdated { provider, result });
    });
}

fn apply_ui_event(app: &mut App, event: UiEvent) {
    match event {
        UiEvent::ChatCompleted(outcome) => {
            app.complete_send(outcome);
            if let Some(entry) = app.messages.back() {
                if let Err(err) = app.logging.log_entry(entry) {
                    warn!(error = %err, "could not log assistant entry");
                }
            }
        }
        UiEvent::UploadCompleted { result } => match result {
            Ok(image) => {
                info!(file = %image.file_name, media_type = %image.media_type, "attachment ready");
                app.upload_succeeded(image);
            }
            Err(detail) => {
                warn!(error = %detail, "image upload failed");
                app.upload_failed(&detail);
            }
        },
        UiEvent::ProviderUpdated { provider, result } => match result {
            Ok(()) => {
                app.append_message(Message::app_info(format!(
                    "Provider set: {}",
                    providers::display_name(&provider)
                )));
            }
            Err(detail) => {
                warn!(provider = %provider, error = %detail, "server rejected provider change");
                app.append_message(Message::app_warning(format!(
                    "Failed to set provider '{provider}' on the server: {detail}"
                )));
            }
        },
    }
}
