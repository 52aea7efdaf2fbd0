use crate::api::TokenUsageWire;

/// Conversation budget assumed when the server omits `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u64 = 200_000;

/// Latest token-usage snapshot. Replaced wholesale on every chat response
/// that carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub used: u64,
    pub max: u64,
}

impl Default for TokenUsage {
    fn default() -> Self {
        TokenUsage {
            used: 0,
            max: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Normal,
    Warning,
    Danger,
}

impl TokenUsage {
    pub fn from_wire(wire: &TokenUsageWire) -> Self {
        let used = wire.total_tokens.unwrap_or(0);
        let max = match wire.max_tokens {
            Some(max) if max > 0 => max,
            _ => DEFAULT_MAX_TOKENS,
        };
        TokenUsage { used, max }
    }

    pub fn percent(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.used as f64 / self.max as f64 * 100.0
    }

    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent())
    }

    /// Fill ratio for the usage bar, capped at 1.0. The label keeps showing
    /// the true percentage even when the bar is pegged.
    pub fn ratio(&self) -> f64 {
        self.percent().min(100.0) / 100.0
    }

    pub fn level(&self) -> UsageLevel {
        let percent = self.percent();
        if percent > 90.0 {
            UsageLevel::Danger
        } else if percent > 75.0 {
            UsageLevel::Warning
        } else {
            UsageLevel::Normal
        }
    }
}

/// "150000" -> "150,000", for the usage readout.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_defaults_fill_in_missing_fields() {
        let usage = TokenUsage::from_wire(&TokenUsageWire {
            total_tokens: None,
            max_tokens: None,
        });
        assert_eq!(usage, TokenUsage::default());

        let usage = TokenUsage::from_wire(&TokenUsageWire {
            total_tokens: Some(5),
            max_tokens: Some(0),
        });
        assert_eq!(usage.max, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn percent_label_shows_one_decimal() {
        let usage = TokenUsage {
            used: 150_000,
            max: 200_000,
        };
        assert_eq!(usage.percent_label(), "75.0%");
        assert!((usage.ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn bar_ratio_is_capped_but_label_is_not() {
        let usage = TokenUsage {
            used: 250_000,
            max: 200_000,
        };
        assert_eq!(usage.ratio(), 1.0);
        assert_eq!(usage.percent_label(), "125.0%");
    }

    #[test]
    fn levels_follow_the_styling_thresholds() {
        let at = |used| TokenUsage {
            used,
            max: 200_000,
        };
        assert_eq!(at(150_000).level(), UsageLevel::Normal);
        assert_eq!(at(160_000).level(), UsageLevel::Warning);
        assert_eq!(at(180_000).level(), UsageLevel::Warning);
        assert_eq!(at(190_000).level(), UsageLevel::Danger);
    }

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(150_000), "150,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
