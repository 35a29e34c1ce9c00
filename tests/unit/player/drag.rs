use std::sync::Arc;

use super::*;
use crate::layout::measure::FixedAdvanceMeasurer;

fn image(w: u32, h: u32) -> Arc<PreparedImage> {
    Arc::new(PreparedImage::solid(w, h, [255, 255, 255, 255]).unwrap())
}

fn overlapping() -> (VideoConfig, LoadedAssets) {
    let config = VideoConfig {
        logo_x: 100.0,
        logo_y: 100.0,
        logo_scale: 1.0,
        watermark_x: 100.0,
        watermark_y: 100.0,
        watermark_scale: 1.0,
        watermark_text: "MARK".into(),
        watermark_text_x: 100.0,
        watermark_text_y: 100.0,
        ..VideoConfig::default()
    };
    let assets = LoadedAssets {
        background: None,
        watermark: Some(image(50, 50)),
        logo: Some(image(20, 20)),
    };
    (config, assets)
}

#[test]
fn logo_wins_over_watermarks() {
    let (config, assets) = overlapping();
    let mut m = FixedAdvanceMeasurer::default();
    let drag = hit_test(&config, &assets, Point::new(110.0, 110.0), &mut m).unwrap();
    assert_eq!(drag.target, DragTarget::Logo);
    assert_eq!(drag.origin_offset, Vec2::new(-10.0, -10.0));
}

#[test]
fn image_watermark_is_checked_before_text() {
    let (config, assets) = overlapping();
    let mut m = FixedAdvanceMeasurer::default();
    let drag = hit_test(&config, &assets, Point::new(140.0, 140.0), &mut m).unwrap();
    assert_eq!(drag.target, DragTarget::ImageWatermark);
}

#[test]
fn text_watermark_box_is_width_by_font_size() {
    let (config, _) = overlapping();
    let assets = LoadedAssets::default();
    let mut m = FixedAdvanceMeasurer::default();
    // "MARK" at 60px with 0.5 em advance is 120px wide.
    let hit = hit_test(&config, &assets, Point::new(219.0, 159.0), &mut m).unwrap();
    assert_eq!(hit.target, DragTarget::TextWatermark);
    assert!(hit_test(&config, &assets, Point::new(221.0, 150.0), &mut m).is_none());
    assert!(hit_test(&config, &assets, Point::new(150.0, 161.0), &mut m).is_none());
}

#[test]
fn unloaded_images_do_not_hit() {
    let (mut config, _) = overlapping();
    config.watermark_text.clear();
    let mut m = FixedAdvanceMeasurer::default();
    let pointer = Point::new(105.0, 105.0);
    assert!(hit_test(&config, &LoadedAssets::default(), pointer, &mut m).is_none());
}

#[test]
fn moving_keeps_the_grab_offset() {
    let (config, assets) = overlapping();
    let mut m = FixedAdvanceMeasurer::default();
    let drag = hit_test(&config, &assets, Point::new(140.0, 140.0), &mut m).unwrap();
    let next = drag.moved_to(&config, Point::new(240.0, 190.0));
    assert_eq!((next.watermark_x, next.watermark_y), (200.0, 150.0));
    assert_eq!((next.logo_x, next.logo_y), (100.0, 100.0));
    assert_eq!((config.watermark_x, config.watermark_y), (100.0, 100.0));
}
