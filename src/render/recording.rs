use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::layout::measure::{FixedAdvanceMeasurer, FontSpec, TextMeasurer};
use crate::render::surface::{FrameRGBA, Shadow, Surface, TextBaseline};

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Surface cleared to a color.
    Clear {
        /// Clear color.
        color: Rgba8,
    },
    /// Rectangle fill.
    FillRect {
        /// Filled area.
        rect: Rect,
        /// Fill color.
        color: Rgba8,
        /// Shadow active at draw time.
        shadow: Option<Shadow>,
    },
    /// Image draw.
    Image {
        /// Source image size.
        source_size: (u32, u32),
        /// Destination rectangle.
        dest: Rect,
        /// Extra opacity.
        opacity: f64,
    },
    /// Text draw.
    Text {
        /// Drawn text.
        text: String,
        /// Font used.
        font: FontSpec,
        /// Anchor point.
        origin: Point,
        /// Vertical anchor.
        baseline: TextBaseline,
        /// Fill color.
        color: Rgba8,
        /// Advance width reported by the measurer.
        width: f64,
        /// Shadow active at draw time.
        shadow: Option<Shadow>,
    },
}

/// Surface that records draw calls instead of rasterizing.
///
/// Text is measured with a [`FixedAdvanceMeasurer`], which makes layouts and draw positions exact
/// and reproducible. [`Surface::read_frame`] returns a frame filled with the last clear color.
#[derive(Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    measurer: FixedAdvanceMeasurer,
    shadow: Option<Shadow>,
    commands: Vec<DrawCommand>,
    clear_color: Rgba8,
    frames_read: u64,
}

impl RecordingSurface {
    /// Create a recording surface with the default fixed advance (0.5 em).
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_measurer(width, height, FixedAdvanceMeasurer::default())
    }

    /// Create a recording surface with a specific measurer.
    pub fn with_measurer(width: u32, height: u32, measurer: FixedAdvanceMeasurer) -> Self {
        Self {
            width,
            height,
            measurer,
            shadow: None,
            commands: Vec::new(),
            clear_color: Rgba8::transparent(),
            frames_read: 0,
        }
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Text draws recorded since the last clear.
    pub fn text_draws(&self) -> impl Iterator<Item = (&str, Point)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, origin, .. } => Some((text.as_str(), *origin)),
            _ => None,
        })
    }

    /// Number of frames read back so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl TextMeasurer for RecordingSurface {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        self.measurer.measure(text, font)
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> ScrollResult<()> {
        if width == 0 || height == 0 {
            return Err(ScrollError::validation("surface dimensions must be non-zero"));
        }
        self.width = width;
        self.height = height;
        self.commands.clear();
        Ok(())
    }

    fn clear(&mut self, color: Rgba8) {
        self.commands.clear();
        self.clear_color = color;
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            shadow: self.shadow,
        });
    }

    fn draw_image(&mut self, image: &Arc<PreparedImage>, dest: Rect, opacity: f64) {
        self.commands.push(DrawCommand::Image {
            source_size: (image.width, image.height),
            dest,
            opacity,
        });
    }

    fn fill_text(
        &mut self,
        text: &str,
        font: &FontSpec,
        origin: Point,
        baseline: TextBaseline,
        color: Rgba8,
    ) {
        let width = self.measurer.measure(text, font);
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            font: font.clone(),
            origin,
            baseline,
            color,
            width,
            shadow: self.shadow,
        });
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow;
    }

    fn read_frame(&mut self) -> ScrollResult<FrameRGBA> {
        self.frames_read += 1;
        let px = self.clear_color.to_premul().to_array();
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data: px.repeat(self.width as usize * self.height as usize),
            premultiplied: true,
        })
    }
}
