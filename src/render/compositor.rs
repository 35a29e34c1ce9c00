use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::loader::LoadedAssets;
use crate::config::model::{LayerOrder, TextAlign, VideoConfig};
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::math::wrap_f64;
use crate::layout::wrap::LineGeometry;
use crate::render::surface::{Shadow, Surface, TextBaseline};

/// Space between ticker repetitions, in pixels.
pub const TICKER_GAP: f64 = 300.0;
/// Vertical padding above and below the ticker text.
pub const TICKER_PADDING: f64 = 20.0;
/// Height of the accent border on top of the ticker bar.
pub const TICKER_BORDER: f64 = 4.0;

/// Everything a frame is drawn from, besides the time.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    /// Configuration snapshot for this tick.
    pub config: &'a VideoConfig,
    /// Wrapped script lines.
    pub lines: &'a LineGeometry,
    /// Decoded image layers.
    pub assets: &'a LoadedAssets,
    /// Effective vertical scroll speed in px/s.
    pub scroll_speed: f64,
}

/// Top edge of line `index` at `time`.
pub fn line_top(canvas_height: f64, time: f64, speed: f64, index: usize, line_height: f64) -> f64 {
    canvas_height - time * speed + index as f64 * line_height
}

/// Return `true` when a line box starting at `top` intersects the canvas.
pub fn line_visible(top: f64, line_height: f64, canvas_height: f64) -> bool {
    top + line_height > 0.0 && top <= canvas_height
}

/// Left edge of a line of `line_width` pixels for the given alignment.
pub fn line_start_x(align: TextAlign, canvas: Canvas, line_width: f64) -> f64 {
    match align {
        TextAlign::Left => canvas.padding_x(),
        TextAlign::Center => canvas.w() / 2.0 - line_width / 2.0,
        TextAlign::Right => canvas.w() - canvas.padding_x() - line_width,
    }
}

/// Destination of a "cover" fit: uniformly scaled to fill the canvas, centered, overflow cropped.
pub fn cover_rect(canvas: Canvas, image_width: f64, image_height: f64) -> Rect {
    let scale = (canvas.w() / image_width).max(canvas.h() / image_height);
    let (w, h) = (image_width * scale, image_height * scale);
    let x = canvas.w() / 2.0 - w / 2.0;
    let y = canvas.h() / 2.0 - h / 2.0;
    Rect::new(x, y, x + w, y + h)
}

/// Left edges of the ticker copies drawn at `time`.
///
/// The copies sit one loop period (`text_width + TICKER_GAP`) apart, move right to left, and
/// always include the three copies around the current offset plus as many extra copies to the left
/// as needed for their periods to cover the whole canvas width.
pub fn ticker_positions(canvas_width: f64, text_width: f64, time: f64, speed: f64) -> Vec<f64> {
    let loop_width = (text_width.max(0.0) + TICKER_GAP).max(1.0);
    let travelled = time * speed;
    let shift = if travelled.is_finite() {
        wrap_f64(travelled, loop_width)
    } else {
        0.0
    };
    let start_x = canvas_width - shift;
    let first = (-(start_x / loop_width).ceil()).min(-1.0) as i64;
    (first..=1)
        .map(|k| start_x + k as f64 * loop_width)
        .collect()
}

fn overlay_rect(image: &PreparedImage, x: f64, y: f64, scale: f64) -> Rect {
    Rect::new(
        x,
        y,
        x + f64::from(image.width) * scale,
        y + f64::from(image.height) * scale,
    )
}

fn draw_overlay(
    surface: &mut dyn Surface,
    image: &Arc<PreparedImage>,
    x: f64,
    y: f64,
    scale: f64,
    opacity: f64,
) {
    surface.set_shadow(None);
    surface.draw_image(image, overlay_rect(image, x, y, scale), opacity);
}

fn draw_image_watermark(surface: &mut dyn Surface, inputs: &FrameInputs<'_>, layer: LayerOrder) {
    let c = inputs.config;
    if c.watermark_layer != layer {
        return;
    }
    if let Some(img) = &inputs.assets.watermark {
        draw_overlay(
            surface,
            img,
            c.watermark_x,
            c.watermark_y,
            c.watermark_scale,
            c.watermark_opacity,
        );
    }
}

fn draw_text_watermark(surface: &mut dyn Surface, inputs: &FrameInputs<'_>, layer: LayerOrder) {
    let c = inputs.config;
    if c.watermark_text.is_empty() || c.watermark_text_layer != layer {
        return;
    }
    // Text watermarks keep the body text's drop shadow, unlike image overlays.
    surface.set_shadow(Some(Shadow::text_default()));
    surface.fill_text(
        &c.watermark_text,
        &c.watermark_font(),
        Point::new(c.watermark_text_x, c.watermark_text_y),
        TextBaseline::Top,
        c.watermark_text_color.with_opacity(c.watermark_text_opacity as f32),
    );
}

fn draw_body_text(surface: &mut dyn Surface, time: f64, inputs: &FrameInputs<'_>) {
    let c = inputs.config;
    let canvas = c.canvas();
    let font = c.body_font();
    let lh = c.line_height_px();

    surface.set_shadow(Some(Shadow::text_default()));
    for (i, line) in inputs.lines.lines.iter().enumerate() {
        let top = line_top(canvas.h(), time, inputs.scroll_speed, i, lh);
        if !line_visible(top, lh, canvas.h()) {
            continue;
        }
        let mut x = line_start_x(c.text_align, canvas, line.width);
        for seg in &line.segments {
            if !seg.is_whitespace() {
                let origin = Point::new(x, top);
                surface.fill_text(&seg.text, &font, origin, TextBaseline::Top, c.text_color);
            }
            x += seg.width;
        }
    }
}

fn draw_ticker(surface: &mut dyn Surface, time: f64, inputs: &FrameInputs<'_>) {
    let c = inputs.config;
    if c.ticker_text.is_empty() {
        return;
    }
    let canvas = c.canvas();
    let font = c.ticker_font();
    let height = font.size_px + TICKER_PADDING * 2.0;
    let top = canvas.h() - height;

    surface.set_shadow(None);
    surface.fill_rect(Rect::new(0.0, top, canvas.w(), canvas.h()), c.ticker_bg_color);
    surface.fill_rect(Rect::new(0.0, top, canvas.w(), top + TICKER_BORDER), c.ticker_color);

    let text_width = surface.measure(&c.ticker_text, &font);
    let mid = top + height / 2.0;
    for x in ticker_positions(canvas.w(), text_width, time, c.ticker_speed) {
        let origin = Point::new(x, mid);
        surface.fill_text(&c.ticker_text, &font, origin, TextBaseline::Middle, c.ticker_color);
    }
}

/// Draw one complete frame for `time`.
///
/// Layer order: background color, background image (cover), back image watermark, back text
/// watermark, scrolling text, front image watermark, front text watermark, logo, ticker. Missing
/// image layers are skipped. Nothing is retained between calls.
#[tracing::instrument(level = "trace", skip(surface, inputs))]
pub fn render_frame(surface: &mut dyn Surface, time: f64, inputs: &FrameInputs<'_>) {
    let c = inputs.config;
    let canvas = c.canvas();

    surface.set_shadow(None);
    surface.clear(c.background_color);
    if let Some(bg) = &inputs.assets.background {
        let dest = cover_rect(canvas, f64::from(bg.width), f64::from(bg.height));
        surface.draw_image(bg, dest, 1.0);
    }

    draw_image_watermark(surface, inputs, LayerOrder::Back);
    draw_text_watermark(surface, inputs, LayerOrder::Back);

    draw_body_text(surface, time, inputs);

    draw_image_watermark(surface, inputs, LayerOrder::Front);
    draw_text_watermark(surface, inputs, LayerOrder::Front);

    if let Some(logo) = &inputs.assets.logo {
        draw_overlay(surface, logo, c.logo_x, c.logo_y, c.logo_scale, c.logo_opacity);
    }

    draw_ticker(surface, time, inputs);
    surface.set_shadow(None);
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
