//! Frame rendering: transcript, attachment preview, token gauge, input area,
//! and the status bar.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::core::app::App;
use crate::core::indicator::RouteStatus;
use crate::core::message::{Message, Sender};
use crate::core::providers::{self, Avatar};
use crate::core::tokens::{format_count, UsageLevel};
use crate::ui::markdown::{render_assistant_text, render_plain};
use crate::ui::theme::Theme;

const INPUT_TITLE: &str = "Message (Enter to send · Alt+Enter newline · Ctrl+C quit)";

/// Animated ellipsis for the pending entry, advanced by the UI tick.
pub fn thinking_dots(tick: u64) -> &'static str {
    match (tick / 3) % 4 {
        0 => "",
        1 => ".",
        2 => "..",
        _ => "...",
    }
}

fn attribution_spans(provider: Option<&str>, theme: &Theme) -> Vec<Span<'static>> {
    let name = provider.unwrap_or("");
    match providers::avatar_for(name) {
        Avatar::Asset(glyph) => {
            let color = providers::provider_color(name);
            vec![
                Span::styled(glyph.to_string(), Style::default().fg(color)),
                Span::raw(" "),
                Span::styled(
                    providers::display_name(name),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]
        }
        Avatar::Badge(badge) => vec![
            Span::styled(format!(" {badge} "), theme.badge_style),
            Span::raw(" "),
            Span::styled(
                providers::display_name(name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ],
    }
}

fn push_message_lines(lines: &mut Vec<Line<'static>>, msg: &Message, app: &App) {
    let theme = &app.theme;
    match msg.sender {
        Sender::User => {
            for (i, content_line) in msg.content.lines().enumerate() {
                if i == 0 {
                    lines.push(Line::from(vec![
                        Span::styled("You: ", theme.user_prefix_style),
                        Span::styled(content_line.to_string(), theme.user_text_style),
                    ]));
                } else {
                    lines.push(Line::from(Span::styled(
                        content_line.to_string(),
                        theme.user_text_style,
                    )));
                }
            }
            if msg.content.is_empty() {
                lines.push(Line::from(Span::styled("You:", theme.user_prefix_style)));
            }
        }
        Sender::Assistant if msg.pending => {
            let mut spans = attribution_spans(msg.provider.as_deref(), theme);
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("Thinking{}", thinking_dots(app.tick)),
                theme.pending_style,
            ));
            lines.push(Line::from(spans));
        }
        Sender::Assistant => {
            lines.push(Line::from(attribution_spans(msg.provider.as_deref(), theme)));
            lines.extend(render_assistant_text(
                &msg.content,
                theme,
                app.markdown_enabled,
                app.syntax_enabled,
            ));
            if let Some(tool) = &msg.tool_name {
                lines.push(Line::from(Span::styled(
                    format!("🔩 Used tool: {tool}"),
                    theme.tool_note_style,
                )));
            }
        }
        Sender::AppInfo => lines.extend(render_plain(&msg.content, theme.app_info_style)),
        Sender::AppWarning => lines.extend(render_plain(&msg.content, theme.app_warning_style)),
        Sender::AppError => lines.extend(render_plain(&msg.content, theme.app_error_style)),
    }
    lines.push(Line::from(""));
}

/// Flatten the transcript into display lines. Shared by the frame renderer,
/// the scroll math, and the render benchmark.
pub fn build_transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for msg in &app.messages {
        push_message_lines(&mut lines, msg, app);
    }

    if app.show_welcome {
        for suggestion in [
            "Try a mode: /mode think · /mode write_code · /mode deep_research · /mode image",
            "Attach an image: /attach photo.png",
            "Pin a provider: /provider claude — or stay on NeuroSwitch auto-routing",
        ] {
            lines.push(Line::from(Span::styled(
                suggestion.to_string(),
                app.theme.suggestion_style,
            )));
        }
        lines.push(Line::from(""));
    }

    lines
}

pub fn max_scroll_offset(app: &App, viewport_height: u16) -> u16 {
    let total = build_transcript_lines(app).len() as u16;
    total.saturating_sub(viewport_height)
}

fn input_line_count(input: &str) -> u16 {
    // split('\n') keeps the trailing empty line a fresh Alt+Enter creates.
    input.split('\n').count().min(6) as u16
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn status_spans(app: &App) -> Vec<Span<'static>> {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        format!("Provider: {}", providers::display_name(&app.session.provider)),
        theme.status_style.add_modifier(Modifier::BOLD),
    )];

    if let Some(mode) = &app.session.mode {
        spans.push(Span::styled(" • ", theme.status_style));
        spans.push(Span::styled(format!("Mode: {mode}"), theme.status_style));
    }

    if let Some(label) = app.route.label() {
        let style = match &app.route {
            RouteStatus::Active => Style::default().fg(theme.gauge_normal),
            RouteStatus::Fallback { .. } => theme.app_warning_style,
            _ => theme.status_style,
        };
        spans.push(Span::styled(" • ", theme.status_style));
        spans.push(Span::styled(label, style));
    }

    let log_status = app.logging.status_string();
    if log_status != "disabled" {
        spans.push(Span::styled(" • ", theme.status_style));
        spans.push(Span::styled(log_status, theme.status_style));
    }

    spans
}

pub fn ui(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let attachment_rows = if app.session.attachment.is_some() { 1 } else { 0 };
    let input_height = input_line_count(&app.input) + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(attachment_rows),
            Constraint::Length(1),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    // Transcript
    let lines = build_transcript_lines(app);
    let available_height = chunks[0].height.saturating_sub(1); // title row
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(available_height);
    let scroll_offset = if app.auto_scroll {
        max_offset
    } else {
        app.scroll_offset.min(max_offset)
    };

    let transcript = Paragraph::new(lines)
        .style(Style::default().bg(theme.background_color))
        .block(Block::default().title(Span::styled("NeuroChat", theme.title_style)))
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[0]);

    // Attachment preview
    if let Some(attachment) = &app.session.attachment {
        let preview = Paragraph::new(Line::from(Span::styled(
            format!(
                "📎 {} ({}, {}) — /detach to remove",
                attachment.file_name,
                attachment.media_type,
                human_size(attachment.decoded_len())
            ),
            theme.app_info_style,
        )))
        .style(Style::default().bg(theme.background_color));
        f.render_widget(preview, chunks[1]);
    }

    // Token usage
    let usage = &app.session.token_usage;
    let gauge_color = match usage.level() {
        UsageLevel::Normal => theme.gauge_normal,
        UsageLevel::Warning => theme.gauge_warning,
        UsageLevel::Danger => theme.gauge_danger,
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(gauge_color).bg(theme.background_color))
        .ratio(usage.ratio())
        .label(format!(
            "{} / {} tokens ({})",
            format_count(usage.used),
            format_count(usage.max),
            usage.percent_label()
        ));
    f.render_widget(gauge, chunks[2]);

    // Input
    let input_lines: Vec<Line> = if app.input.is_empty() {
        vec![Line::from("")]
    } else {
        app.input
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), theme.input_text_style)))
            .collect()
    };
    let input = Paragraph::new(input_lines)
        .style(Style::default().bg(theme.background_color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.input_border_style)
                .title(Span::styled(INPUT_TITLE, theme.title_style)),
        );
    f.render_widget(input, chunks[3]);

    let last_line = app.input.rsplit('\n').next().unwrap_or("");
    let cursor_x = chunks[3].x + 1 + last_line.width() as u16;
    let cursor_y = chunks[3].y + input_line_count(&app.input);
    if cursor_x < chunks[3].right() && cursor_y < chunks[3].bottom() {
        f.set_cursor_position((cursor_x, cursor_y));
    }

    // Status bar
    let status = Paragraph::new(Line::from(status_spans(app)))
        .style(Style::default().bg(theme.background_color));
    f.render_widget(status, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::AUTO_ROUTE;
    use crate::core::session::PendingAttachment;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn transcript_text(app: &App) -> Vec<String> {
        build_transcript_lines(app).iter().map(line_text).collect()
    }

    #[test]
    fn thinking_dots_cycle_through_four_frames() {
        let frames: Vec<&str> = (0..12).step_by(3).map(thinking_dots).collect();
        assert_eq!(frames, vec!["", ".", "..", "..."]);
        assert_eq!(thinking_dots(12), thinking_dots(0));
    }

    #[test]
    fn user_and_pending_entries_render_in_order() {
        let mut app = App::new(AUTO_ROUTE);
        app.begin_send("Hello").unwrap();

        let text = transcript_text(&app);
        assert!(text.iter().any(|l| l == "You: Hello"));
        assert!(text.iter().any(|l| l.contains("Thinking")));
        // The pending entry carries the auto-route badge.
        assert!(text.iter().any(|l| l.contains("NE") && l.contains("Thinking")));
    }

    #[test]
    fn known_provider_entries_use_their_fixed_avatar() {
        let mut app = App::new("claude");
        app.append_message(Message::assistant("Hi!", Some("claude".into()), None));
        let text = transcript_text(&app);
        assert!(text.iter().any(|l| l.contains("✦") && l.contains("Claude")));
    }

    #[test]
    fn tool_note_renders_under_the_reply() {
        let mut app = App::new(AUTO_ROUTE);
        app.append_message(Message::assistant(
            "done",
            Some("claude".into()),
            Some("filecreator".into()),
        ));
        let text = transcript_text(&app);
        assert!(text.iter().any(|l| l.contains("Used tool: filecreator")));
    }

    #[test]
    fn suggestions_show_only_on_the_welcome_screen() {
        let mut app = App::new(AUTO_ROUTE);
        assert!(transcript_text(&app).iter().any(|l| l.contains("/attach")));

        app.begin_send("Hello").unwrap();
        assert!(!transcript_text(&app).iter().any(|l| l.contains("/attach photo.png")));
    }

    #[test]
    fn max_scroll_offset_accounts_for_viewport() {
        let mut app = App::new(AUTO_ROUTE);
        for i in 0..30 {
            app.append_message(Message::user(format!("line {i}")));
        }
        let total = build_transcript_lines(&app).len() as u16;
        assert_eq!(max_scroll_offset(&app, 10), total - 10);
        assert_eq!(max_scroll_offset(&app, total + 5), 0);
    }

    #[test]
    fn input_height_grows_with_newlines_up_to_a_cap() {
        assert_eq!(input_line_count(""), 1);
        assert_eq!(input_line_count("one"), 1);
        assert_eq!(input_line_count("a\nb"), 2);
        assert_eq!(input_line_count("a\nb\nc\nd\ne\nf\ng\nh"), 6);
    }

    #[test]
    fn human_size_picks_sane_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(46_285), "45.2 KB");
        assert_eq!(human_size(2 * 1024 * 1024), "2.0 MB");
    }

    #[test]
    fn status_line_reflects_session_state() {
        let mut app = App::new(AUTO_ROUTE);
        app.session.select_mode("think").unwrap();
        let text: String = status_spans(&app)
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("Provider: NeuroSwitch"));
        assert!(text.contains("Mode: think"));
        assert!(text.contains("NeuroSwitch ready"));

        app.select_provider("claude");
        let text: String = status_spans(&app)
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("Provider: Claude"));
        assert!(!text.contains("ready"));
    }

    #[test]
    fn full_frame_renders_with_attachment_and_pending_entry() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let mut app = App::new(AUTO_ROUTE);
        app.begin_send("describe this").unwrap();
        app.session.set_attachment(PendingAttachment {
            data: "aGVsbG8=".into(),
            media_type: "image/png".into(),
            file_name: "cat.png".into(),
        });
        app.input = "and the\nbackground".to_string();

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let rendered = terminal.backend().buffer().content().iter().fold(
            String::new(),
            |mut acc, cell| {
                acc.push_str(cell.symbol());
                acc
            },
        );
        assert!(rendered.contains("You: describe this"));
        assert!(rendered.contains("Thinking"));
        assert!(rendered.contains("tokens"));
    }
}
