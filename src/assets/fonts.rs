use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ScrollError, ScrollResult};
use crate::layout::measure::FontSpec;

/// A run of shaped glyphs ready for rasterization.
#[derive(Clone, Debug)]
pub struct ShapedText {
    /// Face the glyph ids refer to.
    pub font: vello_cpu::peniko::FontData,
    /// Font size in pixels.
    pub size_px: f32,
    /// Glyphs positioned relative to the top-left of the layout box.
    pub glyphs: Vec<vello_cpu::Glyph>,
    /// Advance width of the run.
    pub width: f64,
    /// Height of the layout box (ascent + descent + leading).
    pub height: f64,
}

struct FontFamily {
    name: String,
    regular: Option<vello_cpu::peniko::FontData>,
    bold: Option<vello_cpu::peniko::FontData>,
}

impl FontFamily {
    fn face(&self, bold: bool) -> Option<&vello_cpu::peniko::FontData> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.bold.as_ref())
        }
    }
}

/// Registered font families plus the Parley contexts used to shape with them.
///
/// Every registration bumps [`FontBook::epoch`]. Layouts keyed on the epoch are therefore
/// recomputed once new faces arrive or [`FontBook::mark_ready`] is called.
pub struct FontBook {
    families: Vec<FontFamily>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<[u8; 4]>,
    epoch: u64,
    ready: bool,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field(
                "families",
                &self.families.iter().map(|f| &f.name).collect::<Vec<_>>(),
            )
            .field("epoch", &self.epoch)
            .field("ready", &self.ready)
            .finish()
    }
}

impl FontBook {
    /// Create an empty book. Nothing is ready until fonts are registered and marked ready.
    pub fn new() -> Self {
        Self {
            families: Vec::new(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            epoch: 0,
            ready: false,
        }
    }

    /// Register one face from raw font bytes and return its family name.
    pub fn register_bytes(&mut self, bytes: Vec<u8>, bold: bool) -> ScrollResult<String> {
        let blob = parley::fontique::Blob::from(bytes.clone());
        let families = self.font_ctx.collection.register_fonts(blob, None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ScrollError::asset("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ScrollError::asset("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        let idx = match self
            .families
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(&name))
        {
            Some(idx) => idx,
            None => {
                self.families.push(FontFamily {
                    name: name.clone(),
                    regular: None,
                    bold: None,
                });
                self.families.len() - 1
            }
        };
        let family = &mut self.families[idx];
        if bold {
            family.bold = Some(data);
        } else {
            family.regular = Some(data);
        }
        self.epoch += 1;
        tracing::debug!(family = %name, bold, epoch = self.epoch, "font face registered");
        Ok(name)
    }

    /// Register a font file; a `-Bold` (or `Bold`) stem suffix marks the bold face.
    pub fn register_file(&mut self, path: &Path) -> ScrollResult<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        self.register_bytes(bytes, is_bold_file_name(path))
    }

    /// Register every `.ttf`/`.otf` file in `dir` (sorted by file name). Returns the count.
    pub fn load_dir(&mut self, dir: &Path) -> ScrollResult<usize> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("read font directory '{}'", dir.display()))?
        {
            let path = entry.context("read font directory entry")?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
            if is_font {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0usize;
        for path in &paths {
            match self.register_file(path) {
                Ok(_) => loaded += 1,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping font file");
                }
            }
        }
        Ok(loaded)
    }

    /// Flip the readiness signal. Bumps the epoch so stale layouts are recomputed.
    pub fn mark_ready(&mut self) {
        self.ready = true;
        self.epoch += 1;
    }

    /// Return `true` once [`FontBook::mark_ready`] was called.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Monotonic counter of font changes.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Names of registered families in registration order.
    pub fn family_names(&self) -> Vec<String> {
        self.families.iter().map(|f| f.name.clone()).collect()
    }

    /// Return `true` when no faces are registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    fn family_for(&self, requested: &str) -> Option<&FontFamily> {
        self.families
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(requested))
            .or_else(|| self.families.first())
    }

    /// Resolve the registered family used for `requested`: exact match, else the first family.
    pub fn resolve_family(&self, requested: &str) -> Option<&str> {
        self.family_for(requested).map(|f| f.name.as_str())
    }

    /// Shape `text` as a single line. Returns `None` when no usable face is registered.
    pub fn shape(&mut self, text: &str, font: &FontSpec) -> Option<ShapedText> {
        let size_px = font.size_px as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return None;
        }
        let (family_name, data) = {
            let family = self.family_for(&font.family)?;
            (family.name.clone(), family.face(font.bold)?.clone())
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        if font.bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush([0, 0, 0, 255]));

        let mut layout: parley::Layout<[u8; 4]> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                }));
            }
        }

        Some(ShapedText {
            font: data,
            size_px,
            glyphs,
            width: f64::from(layout.full_width()),
            height: f64::from(layout.height()),
        })
    }
}

fn is_bold_file_name(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.to_ascii_lowercase().ends_with("bold"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
