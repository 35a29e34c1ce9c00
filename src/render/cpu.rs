use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::fonts::{FontBook, ShapedText};
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{ScrollError, ScrollResult};
use crate::foundation::math::premul_over_in_place;
use crate::layout::measure::{FixedAdvanceMeasurer, FontSpec, TextMeasurer};
use crate::render::blur::{Region, blur_region_in_place};
use crate::render::surface::{FrameRGBA, Shadow, Surface, TextBaseline};

const SHAPE_CACHE_CAPACITY: usize = 4096;
const IMAGE_CACHE_CAPACITY: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ShapeKey {
    text: String,
    family: String,
    size_bits: u64,
    bold: bool,
}

/// CPU raster surface backed by `vello_cpu`, shaping text with Parley through a [`FontBook`].
///
/// Draws are batched into a render context and composited onto the frame whenever the shadow
/// state changes. Shadowed batches rasterize their casters into a separate layer in the shadow
/// color, blur it and place it beneath the batch.
pub struct CpuSurface {
    width: u16,
    height: u16,
    fonts: FontBook,
    base: Vec<u8>,
    ctx: vello_cpu::RenderContext,
    ctx_dirty: bool,
    shadow_ctx: vello_cpu::RenderContext,
    shadow_bounds: Option<Rect>,
    shadow: Option<Shadow>,
    images: Vec<(Arc<PreparedImage>, vello_cpu::Image)>,
    shaped: HashMap<ShapeKey, Option<ShapedText>>,
    shaped_epoch: u64,
    fallback: FixedAdvanceMeasurer,
    warned_missing_font: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fonts", &self.fonts)
            .finish()
    }
}

impl CpuSurface {
    /// Create a transparent surface of `width` x `height` pixels.
    pub fn new(width: u32, height: u32, fonts: FontBook) -> ScrollResult<Self> {
        let (w, h) = checked_dims(width, height)?;
        Ok(Self {
            width: w,
            height: h,
            shaped_epoch: fonts.epoch(),
            fonts,
            base: vec![0u8; usize::from(w) * usize::from(h) * 4],
            ctx: vello_cpu::RenderContext::new(w, h),
            ctx_dirty: false,
            shadow_ctx: vello_cpu::RenderContext::new(w, h),
            shadow_bounds: None,
            shadow: None,
            images: Vec::new(),
            shaped: HashMap::new(),
            fallback: FixedAdvanceMeasurer::default(),
            warned_missing_font: false,
        })
    }

    /// Registered fonts.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Mutable access for registering fonts or flipping readiness.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    fn shape(&mut self, text: &str, font: &FontSpec) -> Option<ShapedText> {
        if self.shaped_epoch != self.fonts.epoch() || self.shaped.len() >= SHAPE_CACHE_CAPACITY {
            self.shaped.clear();
            self.shaped_epoch = self.fonts.epoch();
        }
        let key = ShapeKey {
            text: text.to_owned(),
            family: font.family.clone(),
            size_bits: font.size_px.to_bits(),
            bold: font.bold,
        };
        if let Some(hit) = self.shaped.get(&key) {
            return hit.clone();
        }
        let shaped = self.fonts.shape(text, font);
        self.shaped.insert(key, shaped.clone());
        shaped
    }

    fn image_paint(&mut self, image: &Arc<PreparedImage>) -> ScrollResult<vello_cpu::Image> {
        if let Some((_, paint)) = self.images.iter().find(|(k, _)| Arc::ptr_eq(k, image)) {
            return Ok(paint.clone());
        }
        let pixmap = premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        if self.images.len() >= IMAGE_CACHE_CAPACITY {
            self.images.remove(0);
        }
        self.images.push((Arc::clone(image), paint.clone()));
        Ok(paint)
    }

    fn flush_batch(&mut self) {
        if let Some(bounds) = self.shadow_bounds.take() {
            let mut layer = rasterize(&mut self.shadow_ctx, self.width, self.height);
            if let Some(shadow) = self.shadow {
                let sigma = (shadow.blur / 2.0).max(0.0);
                let radius = (sigma * 3.0).ceil() as u32;
                let region = expand_to_region(bounds, f64::from(radius), self.width, self.height);
                if let Err(err) = blur_region_in_place(
                    layer.data_as_u8_slice_mut(),
                    u32::from(self.width),
                    u32::from(self.height),
                    region,
                    radius,
                    sigma as f32,
                ) {
                    tracing::warn!(error = %err, "shadow blur skipped");
                }
            }
            premul_over_in_place(&mut self.base, layer.data_as_u8_slice());
        }
        if self.ctx_dirty {
            let layer = rasterize(&mut self.ctx, self.width, self.height);
            premul_over_in_place(&mut self.base, layer.data_as_u8_slice());
            self.ctx_dirty = false;
        }
    }

    fn add_shadow_bounds(&mut self, rect: Rect) {
        self.shadow_bounds = Some(match self.shadow_bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    }
}

impl TextMeasurer for CpuSurface {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        match self.shape(text, font) {
            Some(shaped) => shaped.width,
            None => self.fallback.measure(text, font),
        }
    }
}

impl Surface for CpuSurface {
    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> ScrollResult<()> {
        let (w, h) = checked_dims(width, height)?;
        if (w, h) == (self.width, self.height) {
            return Ok(());
        }
        self.width = w;
        self.height = h;
        self.base = vec![0u8; usize::from(w) * usize::from(h) * 4];
        self.ctx = vello_cpu::RenderContext::new(w, h);
        self.ctx_dirty = false;
        self.shadow_ctx = vello_cpu::RenderContext::new(w, h);
        self.shadow_bounds = None;
        tracing::debug!(width, height, "surface resized");
        Ok(())
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx.reset();
        self.shadow_ctx.reset();
        self.ctx_dirty = false;
        self.shadow_bounds = None;
        let px = color.to_premul().to_array();
        for chunk in self.base.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        if let Some(shadow) = self.shadow {
            let shifted = rect + shadow.offset;
            fill_rect_in(&mut self.shadow_ctx, shifted, shadow.color);
            self.add_shadow_bounds(shifted);
        }
        fill_rect_in(&mut self.ctx, rect, color);
        self.ctx_dirty = true;
    }

    fn draw_image(&mut self, image: &Arc<PreparedImage>, dest: Rect, opacity: f64) {
        let paint = match self.image_paint(image) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(error = %err, "image draw skipped");
                return;
            }
        };
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        let transform = vello_cpu::kurbo::Affine::translate((dest.x0, dest.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(dest.width() / w, dest.height() / h);

        let opacity = opacity.clamp(0.0, 1.0) as f32;
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(transform);
        self.ctx.set_paint(paint);
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        self.ctx_dirty = true;
    }

    fn fill_text(
        &mut self,
        text: &str,
        font: &FontSpec,
        origin: Point,
        baseline: TextBaseline,
        color: Rgba8,
    ) {
        if text.is_empty() {
            return;
        }
        let Some(shaped) = self.shape(text, font) else {
            if !self.warned_missing_font {
                tracing::warn!(family = %font.family, "no registered font face; text not drawn");
                self.warned_missing_font = true;
            }
            return;
        };
        let top = match baseline {
            TextBaseline::Top => origin.y,
            TextBaseline::Middle => origin.y - shaped.height / 2.0,
        };
        if let Some(shadow) = self.shadow {
            let (sx, sy) = (origin.x + shadow.offset.x, top + shadow.offset.y);
            draw_glyphs(&mut self.shadow_ctx, &shaped, sx, sy, shadow.color);
            self.add_shadow_bounds(Rect::new(sx, sy, sx + shaped.width, sy + shaped.height));
        }
        draw_glyphs(&mut self.ctx, &shaped, origin.x, top, color);
        self.ctx_dirty = true;
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        if shadow != self.shadow {
            self.flush_batch();
            self.shadow = shadow;
        }
    }

    fn read_frame(&mut self) -> ScrollResult<FrameRGBA> {
        self.flush_batch();
        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.base.clone(),
            premultiplied: true,
        })
    }

    fn font_epoch(&self) -> u64 {
        self.fonts.epoch()
    }
}

fn rasterize(ctx: &mut vello_cpu::RenderContext, width: u16, height: u16) -> vello_cpu::Pixmap {
    let mut pixmap = vello_cpu::Pixmap::new(width, height);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    ctx.reset();
    pixmap
}

fn fill_rect_in(ctx: &mut vello_cpu::RenderContext, rect: Rect, color: Rgba8) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        rect.x0, rect.y0, rect.x1, rect.y1,
    ));
}

fn draw_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    shaped: &ShapedText,
    x: f64,
    y: f64,
    color: Rgba8,
) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    let glyphs = shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    });
    ctx.glyph_run(&shaped.font)
        .font_size(shaped.size_px)
        .fill_glyphs(glyphs);
}

fn expand_to_region(bounds: Rect, margin: f64, width: u16, height: u16) -> Region {
    let clamp = |v: f64, max: u16| -> u32 { v.clamp(0.0, f64::from(max)) as u32 };
    Region {
        x0: clamp((bounds.x0 - margin).floor(), width),
        y0: clamp((bounds.y0 - margin).floor(), height),
        x1: clamp((bounds.x1 + margin).ceil(), width),
        y1: clamp((bounds.y1 + margin).ceil(), height),
    }
}

fn checked_dims(width: u32, height: u32) -> ScrollResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ScrollError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ScrollError::validation("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(ScrollError::validation("surface dimensions must be non-zero"));
    }
    Ok((w, h))
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ScrollResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ScrollError::asset("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ScrollError::asset("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ScrollError::asset("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
