//! Injectable presentation collaborators: date formatting and icon lookup.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::{Debug, Write};
use tracing::warn;

pub const DEFAULT_DATE_PATTERN: &str = "%a %b %-d";

pub trait DateFormatter: Debug {
    fn format(&self, date: NaiveDate) -> String;
}

pub trait AssetResolver: Debug {
    /// Resolve an icon identifier to a displayable asset, if one exists.
    fn resolve(&self, icon_name: &str) -> Option<String>;
}

/// Formats dates with a chrono strftime pattern.
#[derive(Debug, Clone)]
pub struct PatternDateFormatter {
    pattern: String,
}

impl PatternDateFormatter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self { pattern: pattern.into() }
    }
}

impl Default for PatternDateFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_PATTERN)
    }
}

impl DateFormatter for PatternDateFormatter {
    /// Falls back to [`DEFAULT_DATE_PATTERN`] when the pattern cannot be
    /// applied to a date (time or offset fields).
    fn format(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.pattern)).is_ok() {
            return out;
        }
        warn!(pattern = %self.pattern, "date pattern not applicable to a date, using default");
        date.format(DEFAULT_DATE_PATTERN).to_string()
    }
}

/// Maps icon names to single terminal glyphs.
#[derive(Debug, Clone)]
pub struct GlyphResolver {
    glyphs: HashMap<String, String>,
}

impl GlyphResolver {
    pub fn empty() -> Self {
        Self { glyphs: HashMap::new() }
    }

    pub fn with_glyph(mut self, icon_name: impl Into<String>, glyph: impl Into<String>) -> Self {
        self.glyphs.insert(icon_name.into(), glyph.into());
        self
    }
}

impl Default for GlyphResolver {
    fn default() -> Self {
        Self::empty()
            .with_glyph("sunny", "☀")
            .with_glyph("partly-cloudy", "⛅")
            .with_glyph("cloudy", "☁")
            .with_glyph("rain", "☂")
            .with_glyph("thunderstorm", "⚡")
            .with_glyph("snow", "❄")
            .with_glyph("fog", "≡")
            .with_glyph("windy", "≈")
    }
}

impl AssetResolver for GlyphResolver {
    fn resolve(&self, icon_name: &str) -> Option<String> {
        self.glyphs.get(icon_name).cloned()
    }
}
