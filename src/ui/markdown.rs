//! Markdown rendering for assistant replies.
//!
//! Untrusted server text is converted into styled terminal lines with
//! pulldown-cmark, routing fenced code blocks through the syntect
//! highlighter. Any failure in that pipeline degrades to plain,
//! uninterpreted text; a reply is never dropped and the renderer never
//! takes the UI down with it.

use std::panic::{catch_unwind, AssertUnwindSafe};

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use tracing::warn;

use crate::ui::theme::Theme;
use crate::utils::syntax::highlight_code_block;

/// Entry point used by the transcript renderer. Falls back to plain text
/// when markdown is disabled or the rendering pipeline fails.
pub fn render_assistant_text(
    content: &str,
    theme: &Theme,
    markdown_enabled: bool,
    syntax_enabled: bool,
) -> Vec<Line<'static>> {
    if !markdown_enabled {
        return render_plain(content, theme.assistant_text_style);
    }
    let result = catch_unwind(AssertUnwindSafe(|| {
        render_markdown(content, theme, syntax_enabled)
    }));
    match result {
        Ok(lines) => lines,
        Err(_) => {
            warn!("markdown rendering failed; falling back to plain text");
            render_plain(content, theme.assistant_text_style)
        }
    }
}

/// One styled line per source line, no interpretation at all.
pub fn render_plain(content: &str, style: Style) -> Vec<Line<'static>> {
    content
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), style)))
        .collect()
}

struct MarkdownWriter<'t> {
    theme: &'t Theme,
    syntax_enabled: bool,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<Option<u64>>,
    code_lang: Option<String>,
    code_buffer: String,
    link_url: Option<String>,
}

impl<'t> MarkdownWriter<'t> {
    fn new(theme: &'t Theme, syntax_enabled: bool) -> Self {
        MarkdownWriter {
            theme,
            syntax_enabled,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![theme.assistant_text_style],
            list_stack: Vec::new(),
            code_lang: None,
            code_buffer: String::new(),
            link_url: None,
        }
    }

    fn style(&self) -> Style {
        *self.style_stack.last().unwrap_or(&Style::default())
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let next = f(self.style());
        self.style_stack.push(next);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn blank_separator(&mut self) {
        self.flush_line();
        if matches!(self.lines.last(), Some(last) if !line_is_blank(last)) {
            self.lines.push(Line::from(""));
        }
    }

    fn text(&mut self, text: &str) {
        if self.code_lang.is_some() {
            self.code_buffer.push_str(text);
            return;
        }
        let style = self.style();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn finish_code_block(&mut self) {
        let lang = self.code_lang.take().unwrap_or_default();
        let code = std::mem::take(&mut self.code_buffer);

        let highlighted = if self.syntax_enabled {
            highlight_code_block(&lang, &code, self.theme)
        } else {
            None
        };
        match highlighted {
            Some(block) => self.lines.extend(block),
            None => {
                // Plain rendering keeps the block background so code still
                // stands apart from prose.
                let mut style = self.theme.assistant_text_style;
                if let Some(bg) = self.theme.code_block_bg {
                    style = style.bg(bg);
                }
                for line in code.lines() {
                    self.lines
                        .push(Line::from(Span::styled(line.to_string(), style)));
                }
            }
        }
    }

    fn start_item(&mut self) {
        self.flush_line();
        let depth = self.list_stack.len().saturating_sub(1);
        let indent = "  ".repeat(depth);
        let marker = match self.list_stack.last_mut() {
            Some(Some(index)) => {
                let marker = format!("{indent}{index}. ");
                *index += 1;
                marker
            }
            _ => format!("{indent}• "),
        };
        let style = self.style();
        self.current.push(Span::styled(marker, style));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while matches!(self.lines.last(), Some(last) if line_is_blank(last)) {
            self.lines.pop();
        }
        self.lines
    }
}

fn line_is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|s| s.content.is_empty())
}

fn heading_prefix(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "# ",
        HeadingLevel::H2 => "## ",
        HeadingLevel::H3 => "### ",
        HeadingLevel::H4 => "#### ",
        HeadingLevel::H5 => "##### ",
        HeadingLevel::H6 => "###### ",
    }
}

fn render_markdown(content: &str, theme: &Theme, syntax_enabled: bool) -> Vec<Line<'static>> {
    let mut writer = MarkdownWriter::new(theme, syntax_enabled);
    let parser = Parser::new_ext(content, Options::empty());

    for event in parser {
        match event {
            Event::Start(Tag::Paragraph) => {
                // A paragraph opening mid-line continues a list item.
                if writer.current.is_empty() {
                    writer.blank_separator();
                }
            }
            Event::End(TagEnd::Paragraph) => writer.flush_line(),

            Event::Start(Tag::Heading { level, .. }) => {
                writer.blank_separator();
                writer.push_style(|_| theme.heading_style);
                let style = writer.style();
                writer
                    .current
                    .push(Span::styled(heading_prefix(level).to_string(), style));
            }
            Event::End(TagEnd::Heading(_)) => {
                writer.flush_line();
                writer.pop_style();
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                writer.blank_separator();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                writer.code_lang = Some(lang);
            }
            Event::End(TagEnd::CodeBlock) => writer.finish_code_block(),

            Event::Start(Tag::List(start)) => {
                if writer.list_stack.is_empty() {
                    writer.blank_separator();
                }
                writer.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                writer.flush_line();
                writer.list_stack.pop();
            }
            Event::Start(Tag::Item) => writer.start_item(),
            Event::End(TagEnd::Item) => writer.flush_line(),

            Event::Start(Tag::Emphasis) => writer.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Event::End(TagEnd::Emphasis) => writer.pop_style(),
            Event::Start(Tag::Strong) => writer.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Event::End(TagEnd::Strong) => writer.pop_style(),

            Event::Start(Tag::Link { dest_url, .. }) => {
                writer.link_url = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                if let Some(url) = writer.link_url.take() {
                    let style = theme.tool_note_style;
                    writer.current.push(Span::styled(format!(" ({url})"), style));
                }
            }

            Event::Text(text) => writer.text(&text),
            Event::Code(code) => {
                let style = theme.inline_code_style;
                writer.current.push(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak => writer.text(" "),
            Event::HardBreak => writer.flush_line(),
            Event::Rule => {
                writer.blank_separator();
                writer
                    .lines
                    .push(Line::from(Span::styled("────────", theme.tool_note_style)));
            }
            _ => {}
        }
    }

    writer.finish()
}
