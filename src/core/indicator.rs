//! Routing-status indicator.
//!
//! The indicator only has meaning while the auto-route selection is active;
//! with a pinned provider it stays hidden no matter what the server reports.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteStatus {
    /// A specific provider is pinned; nothing to show.
    Hidden,
    /// Auto-route selected, no routing outcome reported yet.
    Ready,
    /// Last auto-routed request used the first-choice provider.
    Active,
    /// Last auto-routed request fell back to an alternate provider.
    Fallback { reason: String },
}

pub fn route_status(
    auto_route_selected: bool,
    active: bool,
    fallback_reason: Option<&str>,
) -> RouteStatus {
    if !auto_route_selected {
        return RouteStatus::Hidden;
    }
    if active {
        return RouteStatus::Active;
    }
    match fallback_reason {
        Some(reason) if !reason.is_empty() => RouteStatus::Fallback {
            reason: reason.to_string(),
        },
        _ => RouteStatus::Ready,
    }
}

impl RouteStatus {
    /// Status-bar text, or `None` when the indicator is hidden.
    pub fn label(&self) -> Option<String> {
        match self {
            RouteStatus::Hidden => None,
            RouteStatus::Ready => Some("⚙ NeuroSwitch ready".to_string()),
            RouteStatus::Active => Some("✔ NeuroSwitch active".to_string()),
            RouteStatus::Fallback { reason } => {
                Some(format!("⚠ NeuroSwitch fallback: {reason}"))
            }
        }
    }
}
