use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Point, Rect, Rgba8, Vec2};
use crate::foundation::error::ScrollResult;
use crate::layout::measure::{FontSpec, TextMeasurer};

/// A rendered frame in RGBA8 (premultiplied when `premultiplied` is set).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major pixel bytes.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        out
    }

    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(idx..idx + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Vertical anchor of the `y` coordinate passed to [`Surface::fill_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    /// `y` is the top of the line box.
    #[default]
    Top,
    /// `y` is the vertical middle of the line box.
    Middle,
}

/// Soft drop shadow applied to subsequent draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color (its alpha is the shadow strength).
    pub color: Rgba8,
    /// Blur amount in pixels; the gaussian sigma is half of it.
    pub blur: f64,
    /// Offset from the casting shape.
    pub offset: Vec2,
}

impl Shadow {
    /// The fixed text shadow: black at 80%, blur 6, offset (3, 3).
    pub fn text_default() -> Self {
        Self {
            color: Rgba8::rgba(0, 0, 0, 204),
            blur: 6.0,
            offset: Vec2::new(3.0, 3.0),
        }
    }
}

/// 2D raster target the compositor draws into.
///
/// The surface is also the text measurer: widths used for layout must come from the same font
/// machinery that paints the glyphs.
pub trait Surface: TextMeasurer {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Change the pixel size. Pending draws and pixel content are discarded.
    fn resize(&mut self, width: u32, height: u32) -> ScrollResult<()>;

    /// Reset every pixel to `color` and drop any pending draws.
    fn clear(&mut self, color: Rgba8);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    /// Draw `image` scaled into `dest` with an extra `opacity` factor.
    fn draw_image(&mut self, image: &Arc<PreparedImage>, dest: Rect, opacity: f64);

    /// Draw a single line of text with its left edge at `origin.x`.
    fn fill_text(
        &mut self,
        text: &str,
        font: &FontSpec,
        origin: Point,
        baseline: TextBaseline,
        color: Rgba8,
    );

    /// Set or clear the drop shadow for subsequent draws.
    fn set_shadow(&mut self, shadow: Option<Shadow>);

    /// Resolve pending draws and return the frame.
    fn read_frame(&mut self) -> ScrollResult<FrameRGBA>;

    /// Counter that changes whenever font metrics may have changed.
    fn font_epoch(&self) -> u64 {
        0
    }
}
