use crate::assets::fonts::FontBook;

/// Font selection for a text draw or measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Primary family name, without quotes.
    pub family: String,
    /// Font size in pixels.
    pub size_px: f64,
    /// Request the bold face.
    pub bold: bool,
}

impl FontSpec {
    /// Create a font spec for an explicit family name.
    pub fn new(family: impl Into<String>, size_px: f64, bold: bool) -> Self {
        Self {
            family: family.into(),
            size_px,
            bold,
        }
    }

    /// Build from a CSS-like family list (`"'Inter', sans-serif"`), keeping the first family.
    pub fn from_css(families: &str, size_px: f64, bold: bool) -> Self {
        let first = families.split(',').next().unwrap_or_default();
        let family = first.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        Self::new(family, size_px, bold)
    }
}

/// Measures the advance width of a run of text.
///
/// The measurer used for layout must be the same one the surface draws with, otherwise segment
/// widths and painted glyph advances drift apart.
pub trait TextMeasurer {
    /// Advance width of `text` in pixels at `font`.
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64;
}

/// Deterministic measurer: every character advances `size_px * em_ratio`.
///
/// Useful for headless layout, tests and sizing estimates when no font data is registered.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvanceMeasurer {
    em_ratio: f64,
}

impl FixedAdvanceMeasurer {
    /// Create a measurer with the given per-character advance in ems.
    pub fn new(em_ratio: f64) -> Self {
        Self { em_ratio }
    }

    /// Per-character advance in ems.
    pub fn em_ratio(&self) -> f64 {
        self.em_ratio
    }
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * font.size_px * self.em_ratio
    }
}

/// Measures with shaped glyph advances from a [`FontBook`].
///
/// Falls back to fixed advances while no usable face is registered, so layout never blocks on font
/// loading; the font epoch bump on registration then invalidates that provisional layout.
pub struct FontMeasurer<'a> {
    fonts: &'a mut FontBook,
    fallback: FixedAdvanceMeasurer,
}

impl<'a> FontMeasurer<'a> {
    /// Measure with `fonts`, using the default fixed advance as fallback.
    pub fn new(fonts: &'a mut FontBook) -> Self {
        Self {
            fonts,
            fallback: FixedAdvanceMeasurer::default(),
        }
    }
}

impl TextMeasurer for FontMeasurer<'_> {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        match self.fonts.shape(text, font) {
            Some(shaped) => shaped.width,
            None => self.fallback.measure(text, font),
        }
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &mut M {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        (**self).measure(text, font)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/measure.rs"]
mod tests;
