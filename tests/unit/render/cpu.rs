use super::*;
use crate::foundation::core::Vec2;

fn close(px: [u8; 4], want: [u8; 4], tol: u8) -> bool {
    px.iter().zip(want.iter()).all(|(a, b)| a.abs_diff(*b) <= tol)
}

fn surface(w: u32, h: u32) -> CpuSurface {
    CpuSurface::new(w, h, FontBook::new()).unwrap()
}

#[test]
fn dimensions_are_validated() {
    assert!(CpuSurface::new(0, 10, FontBook::new()).is_err());
    assert!(CpuSurface::new(70_000, 10, FontBook::new()).is_err());
}

#[test]
fn clear_fills_every_pixel() {
    let mut s = surface(4, 3);
    s.clear(Rgba8::rgb(255, 0, 0));
    let frame = s.read_frame().unwrap();
    assert_eq!((frame.width, frame.height), (4, 3));
    assert!(frame.premultiplied);
    assert!(frame.data.chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
}

#[test]
fn rects_composite_over_the_background() {
    let mut s = surface(8, 8);
    s.clear(Rgba8::rgb(0, 0, 0));
    s.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0), Rgba8::rgb(0, 0, 255));
    s.fill_rect(Rect::new(0.0, 6.0, 8.0, 8.0), Rgba8::rgba(255, 255, 255, 128));
    let frame = s.read_frame().unwrap();
    assert!(close(frame.pixel(3, 3).unwrap(), [0, 0, 255, 255], 1));
    assert!(close(frame.pixel(0, 0).unwrap(), [0, 0, 0, 255], 0));
    assert!(close(frame.pixel(4, 7).unwrap(), [128, 128, 128, 255], 2));
}

#[test]
fn images_are_scaled_into_the_destination() {
    let mut s = surface(8, 8);
    s.clear(Rgba8::rgb(0, 0, 0));
    let img = Arc::new(PreparedImage::solid(2, 2, [0, 255, 0, 255]).unwrap());
    s.draw_image(&img, Rect::new(0.0, 0.0, 8.0, 4.0), 1.0);
    s.draw_image(&img, Rect::new(0.0, 4.0, 8.0, 8.0), 0.5);
    let frame = s.read_frame().unwrap();
    assert!(close(frame.pixel(4, 2).unwrap(), [0, 255, 0, 255], 2));
    assert!(close(frame.pixel(4, 6).unwrap(), [0, 128, 0, 255], 3));
}

#[test]
fn shadows_land_offset_beneath_the_caster() {
    let mut s = surface(12, 12);
    s.clear(Rgba8::rgb(255, 255, 255));
    s.set_shadow(Some(Shadow {
        color: Rgba8::rgb(0, 0, 0),
        blur: 0.0,
        offset: Vec2::new(3.0, 3.0),
    }));
    s.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgba8::rgb(255, 0, 0));
    s.set_shadow(None);
    let frame = s.read_frame().unwrap();
    assert!(close(frame.pixel(1, 1).unwrap(), [255, 0, 0, 255], 1));
    assert!(close(frame.pixel(5, 5).unwrap(), [0, 0, 0, 255], 1));
    assert!(close(frame.pixel(10, 10).unwrap(), [255, 255, 255, 255], 0));
}

#[test]
fn text_without_fonts_measures_with_fallback_and_draws_nothing() {
    let mut s = surface(16, 16);
    let font = FontSpec::new("Inter", 10.0, false);
    assert_eq!(s.measure("abcd", &font), 20.0);

    s.clear(Rgba8::rgb(10, 20, 30));
    s.fill_text("abcd", &font, Point::new(0.0, 0.0), TextBaseline::Top, Rgba8::rgb(255, 255, 255));
    let frame = s.read_frame().unwrap();
    assert!(frame.data.chunks_exact(4).all(|p| p == [10, 20, 30, 255]));
}

#[test]
fn font_epoch_follows_the_book() {
    let mut s = surface(2, 2);
    let before = s.font_epoch();
    s.fonts_mut().mark_ready();
    assert!(s.font_epoch() > before);
}

#[test]
fn region_expansion_is_clamped() {
    let r = expand_to_region(Rect::new(-5.0, 2.0, 3.5, 50.0), 2.0, 10, 20);
    assert_eq!(
        r,
        Region {
            x0: 0,
            y0: 0,
            x1: 6,
            y1: 20
        }
    );
}

#[test]
fn resize_changes_frame_size() {
    let mut s = surface(4, 4);
    s.resize(6, 2).unwrap();
    s.clear(Rgba8::rgb(0, 255, 0));
    let frame = s.read_frame().unwrap();
    assert_eq!((frame.width, frame.height), (6, 2));
    assert_eq!(frame.data.len(), 6 * 2 * 4);
    assert!(s.resize(0, 2).is_err());
}
