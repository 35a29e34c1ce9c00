use crate::assets::decode::PreparedImage;
use crate::assets::loader::LoadedAssets;
use crate::config::model::VideoConfig;
use crate::foundation::core::{Point, Rect, Vec2};
use crate::layout::measure::TextMeasurer;

/// Overlay that can be moved with the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragTarget {
    /// The logo image.
    Logo,
    /// The image watermark.
    ImageWatermark,
    /// The text watermark.
    TextWatermark,
}

/// An active drag: the grabbed overlay and its position relative to the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drag {
    /// Grabbed overlay.
    pub target: DragTarget,
    /// Overlay origin minus the pointer position at grab time.
    pub origin_offset: Vec2,
}

impl Drag {
    /// Snapshot with the grabbed overlay moved so it keeps its offset to `pointer`.
    pub fn moved_to(&self, config: &VideoConfig, pointer: Point) -> VideoConfig {
        let p = pointer + self.origin_offset;
        config.edit(|c| match self.target {
            DragTarget::Logo => (c.logo_x, c.logo_y) = (p.x, p.y),
            DragTarget::ImageWatermark => (c.watermark_x, c.watermark_y) = (p.x, p.y),
            DragTarget::TextWatermark => (c.watermark_text_x, c.watermark_text_y) = (p.x, p.y),
        })
    }
}

fn image_box(image: &PreparedImage, x: f64, y: f64, scale: f64) -> Rect {
    Rect::new(
        x,
        y,
        x + f64::from(image.width) * scale,
        y + f64::from(image.height) * scale,
    )
}

fn contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

fn target_origin(config: &VideoConfig, target: DragTarget) -> Point {
    match target {
        DragTarget::Logo => Point::new(config.logo_x, config.logo_y),
        DragTarget::ImageWatermark => Point::new(config.watermark_x, config.watermark_y),
        DragTarget::TextWatermark => Point::new(config.watermark_text_x, config.watermark_text_y),
    }
}

/// Find the overlay under `pointer`, checking logo, then image watermark, then text watermark.
///
/// Image overlays only hit once loaded. The text watermark box is its measured width by its font
/// size.
pub fn hit_test(
    config: &VideoConfig,
    assets: &LoadedAssets,
    pointer: Point,
    measurer: &mut dyn TextMeasurer,
) -> Option<Drag> {
    let mut target = None;
    if let Some(logo) = &assets.logo
        && contains_inclusive(
            image_box(logo, config.logo_x, config.logo_y, config.logo_scale),
            pointer,
        )
    {
        target = Some(DragTarget::Logo);
    }
    if target.is_none()
        && let Some(mark) = &assets.watermark
        && contains_inclusive(
            image_box(mark, config.watermark_x, config.watermark_y, config.watermark_scale),
            pointer,
        )
    {
        target = Some(DragTarget::ImageWatermark);
    }
    if target.is_none() && !config.watermark_text.is_empty() {
        let width = measurer.measure(&config.watermark_text, &config.watermark_font());
        let r = Rect::new(
            config.watermark_text_x,
            config.watermark_text_y,
            config.watermark_text_x + width,
            config.watermark_text_y + config.watermark_text_font_size,
        );
        if contains_inclusive(r, pointer) {
            target = Some(DragTarget::TextWatermark);
        }
    }

    let target = target?;
    tracing::debug!(?target, "drag started");
    Some(Drag {
        target,
        origin_offset: target_origin(config, target) - pointer,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/player/drag.rs"]
mod tests;
