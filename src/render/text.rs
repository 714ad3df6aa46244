use anyhow::Context;

use crate::foundation::error::EracastResult;

/// Typeface family slot used by the slide layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FontRole {
    /// Display face: cover and deep-history levels.
    Display,
    /// Serif face: mid levels and the cover subtitle.
    Serif,
    /// Sans face: era labels, watermark text, shallow levels.
    Sans,
}

/// Fully resolved text style for one run of slide text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FontStyle {
    /// Family slot.
    pub role: FontRole,
    /// Italic cut requested.
    pub italic: bool,
}

impl FontStyle {
    /// Style of the main text for a slide level.
    ///
    /// Cover and levels >= 4 use the display face, levels >= 2 the serif,
    /// everything else the sans. Levels >= 3 are italic.
    pub fn main_for_level(level: i32) -> Self {
        let role = if level == 0 || level >= 4 {
            FontRole::Display
        } else if level >= 2 {
            FontRole::Serif
        } else {
            FontRole::Sans
        };
        Self {
            role,
            italic: level >= 3,
        }
    }

    /// Upright style for a role.
    pub const fn upright(role: FontRole) -> Self {
        Self {
            role,
            italic: false,
        }
    }
}

/// Main text size for a slide level, in px.
pub fn main_text_size(level: i32) -> f32 {
    if level == 0 { 80.0 } else { 60.0 }
}

/// Measures text width for layout, independent of rasterization.
pub trait GlyphMeasure {
    /// Advance width of `text` at `size` px in the given style.
    fn text_width(&self, style: FontStyle, size: f32, text: &str) -> f32;
}

/// The parsed font faces a run renders with.
///
/// Faces are caller-supplied bytes so the render path never touches font
/// discovery. The display face has no italic cut; italic display levels
/// render the upright face.
pub struct FontSet {
    display: fontdue::Font,
    serif: fontdue::Font,
    serif_italic: fontdue::Font,
    sans: fontdue::Font,
}

impl FontSet {
    /// Parse the four faces from raw TTF/OTF bytes.
    pub fn from_bytes(
        display: &[u8],
        serif: &[u8],
        serif_italic: &[u8],
        sans: &[u8],
    ) -> EracastResult<Self> {
        let parse = |bytes: &[u8], name: &str| -> EracastResult<fontdue::Font> {
            Ok(
                fontdue::Font::from_bytes(bytes.to_vec(), fontdue::FontSettings::default())
                    .map_err(|e| anyhow::anyhow!("{e}"))
                    .with_context(|| format!("parse {name} font"))?,
            )
        };
        Ok(Self {
            display: parse(display, "display")?,
            serif: parse(serif, "serif")?,
            serif_italic: parse(serif_italic, "serif italic")?,
            sans: parse(sans, "sans")?,
        })
    }

    /// Resolve a style to a concrete face.
    pub fn face(&self, style: FontStyle) -> &fontdue::Font {
        match (style.role, style.italic) {
            (FontRole::Display, _) => &self.display,
            (FontRole::Serif, true) => &self.serif_italic,
            (FontRole::Serif, false) => &self.serif,
            (FontRole::Sans, _) => &self.sans,
        }
    }
}

impl GlyphMeasure for FontSet {
    fn text_width(&self, style: FontStyle, size: f32, text: &str) -> f32 {
        let font = self.face(style);
        text.chars()
            .map(|c| font.metrics(c, size).advance_width)
            .sum()
    }
}

/// Greedy word wrap against a maximum advance width.
///
/// Words join with single spaces; a word that alone exceeds `max_width`
/// still occupies its own line. Always returns at least one line.
pub fn wrap_text(
    measure: &dyn GlyphMeasure,
    style: FontStyle,
    size: f32,
    max_width: f32,
    text: &str,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if !line.is_empty() && measure.text_width(style, size, &candidate) > max_width {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    lines.push(line);
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
