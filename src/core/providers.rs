//! Provider identities and avatar resolution.
//!
//! The backend routes to a small set of named providers, plus the special
//! auto-route selection that lets the server pick. Known providers carry a
//! fixed brand avatar; everything else gets a badge derived from its name.

use ratatui::style::Color;

/// Special selection meaning "let the backend pick the best provider".
pub const AUTO_ROUTE: &str = "neuroswitch";

/// Reserved badge initials for the auto-route selection.
pub const AUTO_ROUTE_BADGE: &str = "NE";

pub const AUTO_ROUTE_DISPLAY_NAME: &str = "NeuroSwitch";

#[derive(Debug, Clone, Copy)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Fixed avatar glyph, the terminal stand-in for the brand image asset.
    pub avatar: &'static str,
    pub color: Color,
}

/// Providers with a fixed brand avatar. Names not in this table fall back to
/// a derived badge.
pub const KNOWN_PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: "claude",
        display_name: "Claude",
        avatar: "✦",
        color: Color::Rgb(217, 119, 87),
    },
    ProviderInfo {
        id: "openai",
        display_name: "OpenAI",
        avatar: "⬡",
        color: Color::Rgb(116, 170, 156),
    },
    ProviderInfo {
        id: "gemini",
        display_name: "Gemini",
        avatar: "◇",
        color: Color::Rgb(110, 140, 230),
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    /// Fixed glyph for a provider in the known set.
    Asset(&'static str),
    /// Two-letter badge derived from the provider name.
    Badge(String),
}

pub fn is_auto_route(name: &str) -> bool {
    name.eq_ignore_ascii_case(AUTO_ROUTE)
}

pub fn find_provider(name: &str) -> Option<&'static ProviderInfo> {
    KNOWN_PROVIDERS
        .iter()
        .find(|info| info.id.eq_ignore_ascii_case(name))
}

pub fn avatar_for(name: &str) -> Avatar {
    if is_auto_route(name) {
        return Avatar::Badge(AUTO_ROUTE_BADGE.to_string());
    }
    if let Some(info) = find_provider(name) {
        return Avatar::Asset(info.avatar);
    }
    Avatar::Badge(derive_badge(name))
}

pub fn display_name(name: &str) -> String {
    if is_auto_route(name) {
        return AUTO_ROUTE_DISPLAY_NAME.to_string();
    }
    match find_provider(name) {
        Some(info) => info.display_name.to_string(),
        None => name.to_string(),
    }
}

pub fn provider_color(name: &str) -> Color {
    match find_provider(name) {
        Some(info) => info.color,
        None => Color::Gray,
    }
}

fn derive_badge(name: &str) -> String {
    let initials: String = name
        .trim()
        .chars()
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        "??".to_string()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_have_fixed_avatars() {
        for info in KNOWN_PROVIDERS {
            assert_eq!(avatar_for(info.id), Avatar::Asset(info.avatar));
        }
    }

    #[test]
    fn avatar_lookup_is_case_insensitive() {
        assert_eq!(avatar_for("Claude"), avatar_for("claude"));
        assert_eq!(avatar_for("OPENAI"), avatar_for("openai"));
    }

    #[test]
    fn auto_route_gets_reserved_initials() {
        assert_eq!(avatar_for("neuroswitch"), Avatar::Badge("NE".to_string()));
        assert_eq!(avatar_for("NeuroSwitch"), Avatar::Badge("NE".to_string()));
    }

    #[test]
    fn unknown_providers_get_a_two_letter_badge() {
        assert_eq!(avatar_for("mistral"), Avatar::Badge("MI".to_string()));
        assert_eq!(avatar_for("x"), Avatar::Badge("X".to_string()));
        assert_eq!(avatar_for(""), Avatar::Badge("??".to_string()));
    }

    #[test]
    fn display_names_resolve() {
        assert_eq!(display_name("claude"), "Claude");
        assert_eq!(display_name("neuroswitch"), "NeuroSwitch");
        assert_eq!(display_name("mistral"), "mistral");
    }
}
