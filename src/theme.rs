//! Colour and badge lookup tables.
//!
//! Every table maps known keys to a swatch and has one explicit fallback,
//! so unrecognised categories and sentiments still render.

use crate::analysis::category_display_label;
use crate::models::{Sentiment, UNCATEGORIZED};
use console::Style;

/// A palette entry: hex for Markdown/JSON output, 256-colour code for terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub hex: &'static str,
    pub ansi256: u8,
}

impl Swatch {
    const fn new(hex: &'static str, ansi256: u8) -> Self {
        Self { hex, ansi256 }
    }

    /// Foreground style for terminal output.
    pub fn style(&self) -> Style {
        Style::new().color256(self.ansi256)
    }
}

pub const BLUE_500: Swatch = Swatch::new("#3b82f6", 69);
pub const BLUE_400: Swatch = Swatch::new("#60a5fa", 75);
pub const RED_500: Swatch = Swatch::new("#ef4444", 203);
pub const RED_400: Swatch = Swatch::new("#f87171", 210);
pub const VIOLET_500: Swatch = Swatch::new("#8b5cf6", 99);
pub const VIOLET_400: Swatch = Swatch::new("#a78bfa", 141);
pub const EMERALD_500: Swatch = Swatch::new("#10b981", 36);
pub const AMBER_500: Swatch = Swatch::new("#f59e0b", 214);
pub const SLATE_400: Swatch = Swatch::new("#94a3b8", 109);
pub const SLATE_500: Swatch = Swatch::new("#64748b", 66);
pub const SLATE_600: Swatch = Swatch::new("#475569", 60);

const CATEGORY_COLORS: &[(&str, Swatch)] = &[
    ("praise", BLUE_500),
    ("bug", RED_500),
    ("feature_request", VIOLET_500),
    (UNCATEGORIZED, SLATE_500),
];
const DEFAULT_CATEGORY_COLOR: Swatch = SLATE_500;

const CATEGORY_BADGES: &[(&str, Swatch)] = &[
    ("bug", RED_400),
    ("feature_request", VIOLET_400),
    ("praise", BLUE_400),
];
const DEFAULT_CATEGORY_BADGE: Swatch = SLATE_400;

const SENTIMENT_BADGES: &[(&str, Swatch)] = &[
    ("positive", EMERALD_500),
    ("negative", RED_500),
    ("neutral", AMBER_500),
];
const DEFAULT_SENTIMENT_BADGE: Swatch = SLATE_500;

/// Badge shown for a missing value.
const ABSENT_BADGE: Swatch = SLATE_600;

fn lookup(table: &[(&str, Swatch)], key: &str) -> Option<Swatch> {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, swatch)| *swatch)
}

/// Bar colour for a category key. Exact match, unknown keys get the
/// `uncategorized` colour.
pub fn category_color(key: &str) -> Swatch {
    lookup(CATEGORY_COLORS, key).unwrap_or(DEFAULT_CATEGORY_COLOR)
}

/// Chart colour for a sentiment class.
pub fn sentiment_color(sentiment: Sentiment) -> Swatch {
    match sentiment {
        Sentiment::Positive => EMERALD_500,
        Sentiment::Negative => RED_500,
        Sentiment::Neutral => AMBER_500,
    }
}

/// A table cell badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub swatch: Swatch,
}

/// Category badge for the feedback table.
pub fn category_badge(category: Option<&str>) -> Badge {
    match category.filter(|c| !c.is_empty()) {
        None => Badge {
            text: "-".to_string(),
            swatch: ABSENT_BADGE,
        },
        Some(category) => Badge {
            text: category_display_label(category),
            swatch: lookup(CATEGORY_BADGES, &category.to_lowercase())
                .unwrap_or(DEFAULT_CATEGORY_BADGE),
        },
    }
}

/// Sentiment badge for the feedback table.
pub fn sentiment_badge(sentiment: Option<&str>) -> Badge {
    match sentiment.filter(|s| !s.is_empty()) {
        None => Badge {
            text: "PENDING".to_string(),
            swatch: ABSENT_BADGE,
        },
        Some(sentiment) => Badge {
            text: sentiment.to_uppercase(),
            swatch: lookup(SENTIMENT_BADGES, &sentiment.to_lowercase())
                .unwrap_or(DEFAULT_SENTIMENT_BADGE),
        },
    }
}
