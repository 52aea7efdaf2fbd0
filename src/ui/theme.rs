use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub app_info_style: Style,
    pub app_warning_style: Style,
    pub app_error_style: Style,
    pub pending_style: Style,
    pub tool_note_style: Style,
    pub badge_style: Style,

    // Chrome
    pub title_style: Style,
    pub input_border_style: Style,
    pub input_text_style: Style,
    pub status_style: Style,
    pub suggestion_style: Style,

    // Token usage gauge
    pub gauge_normal: Color,
    pub gauge_warning: Color,
    pub gauge_danger: Color,

    // Markdown
    pub heading_style: Style,
    pub inline_code_style: Style,
    pub code_block_bg: Option<Color>,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            app_info_style: Style::default().fg(Color::DarkGray),
            app_warning_style: Style::default().fg(Color::Yellow),
            app_error_style: Style::default().fg(Color::Red),
            pending_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            tool_note_style: Style::default().fg(Color::DarkGray),
            badge_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD),

            title_style: Style::default().fg(Color::Gray),
            input_border_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
            status_style: Style::default().fg(Color::DarkGray),
            suggestion_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            gauge_normal: Color::Green,
            gauge_warning: Color::Yellow,
            gauge_danger: Color::Red,

            heading_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            inline_code_style: Style::default().fg(Color::LightYellow),
            code_block_bg: Some(Color::Rgb(24, 24, 24)),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_text_style: Style::default().fg(Color::Black),
            app_info_style: Style::default().fg(Color::Gray),
            app_warning_style: Style::default().fg(Color::Rgb(150, 110, 0)),
            app_error_style: Style::default().fg(Color::Red),
            pending_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            tool_note_style: Style::default().fg(Color::Gray),
            badge_style: Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),

            title_style: Style::default().fg(Color::DarkGray),
            input_border_style: Style::default().fg(Color::Black),
            input_text_style: Style::default().fg(Color::Black),
            status_style: Style::default().fg(Color::Gray),
            suggestion_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),

            gauge_normal: Color::Green,
            gauge_warning: Color::Rgb(180, 130, 0),
            gauge_danger: Color::Red,

            heading_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            inline_code_style: Style::default().fg(Color::Rgb(130, 80, 0)),
            code_block_bg: Some(Color::Rgb(235, 235, 235)),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            // Fallback
            _ => Self::dark_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_names_fall_back_to_dark() {
        let theme = Theme::from_name("no-such-theme");
        assert_eq!(theme.background_color, Theme::dark_default().background_color);
    }

    #[test]
    fn light_theme_uses_a_light_background() {
        assert_eq!(Theme::from_name("Light").background_color, Color::White);
    }
}
