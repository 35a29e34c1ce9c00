use super::*;

#[test]
fn defaults_match_product_defaults() {
    let c = VideoConfig::default();
    assert_eq!(c.font_size, 48.0);
    assert_eq!(c.line_height, 1.5);
    assert_eq!(c.scroll_speed, 50.0);
    assert_eq!(c.fps, 30);
    assert_eq!(c.canvas(), Canvas { width: 1920, height: 1080 });
    assert_eq!(c.ticker_bg_color, Rgba8::rgb(0x0f, 0x17, 0x2a));
    assert_eq!(c.watermark_layer, LayerOrder::Back);
    assert_eq!(c.watermark_text_layer, LayerOrder::Front);
    c.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let c = VideoConfig::from_json_str(
        r##"{"script":"Hello","aspectRatio":"9:16","textAlign":"center","textColor":"#ff0000"}"##,
    )
    .unwrap();
    assert_eq!(c.script, "Hello");
    assert_eq!(c.aspect_ratio, AspectRatio::Portrait);
    assert_eq!(c.text_align, TextAlign::Center);
    assert_eq!(c.text_color, Rgba8::rgb(255, 0, 0));
    assert_eq!(c.font_size, 48.0);
    assert_eq!(c.canvas(), Canvas { width: 1080, height: 1920 });
}

#[test]
fn aspect_ratio_table() {
    assert_eq!(AspectRatio::Square.canvas(), Canvas { width: 1080, height: 1080 });
    assert_eq!(AspectRatio::FourFive.canvas(), Canvas { width: 1080, height: 1350 });
}

#[test]
fn json_round_trip_preserves_snapshot() {
    let c = VideoConfig::default().edit(|c| {
        c.script = "A\n\nB".to_owned();
        c.logo_url = Some("logo.png".to_owned());
        c.watermark_text_layer = LayerOrder::Back;
    });
    let back = VideoConfig::from_json_str(&c.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, c);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let base = VideoConfig::default();
    assert!(base.edit(|c| c.font_size = 0.0).validate().is_err());
    assert!(base.edit(|c| c.bg_music_volume = 1.5).validate().is_err());
    assert!(base.edit(|c| c.fps = 0).validate().is_err());
    assert!(base.edit(|c| c.logo_x = f64::NAN).validate().is_err());
    assert!(base.edit(|c| c.scroll_speed = -1.0).validate().is_err());
}

#[test]
fn edit_leaves_the_original_untouched() {
    let a = VideoConfig::default();
    let b = a.edit(|c| c.logo_x = 10.0);
    assert_eq!(a.logo_x, 50.0);
    assert_eq!(b.logo_x, 10.0);
}

#[test]
fn changes_track_reload_relevant_fields() {
    let a = VideoConfig::default();
    let b = a.edit(|c| {
        c.audio_url = Some("voice.wav".to_owned());
        c.bg_music_volume = 0.2;
    });
    let d = b.changes_from(&a);
    assert!(d.voice_source);
    assert!(d.music_volume);
    assert!(!d.music_source);
    assert!(!d.logo_image);
    assert_eq!(a.changes_from(&a), ConfigChanges::default());
}

#[test]
fn body_font_uses_first_family() {
    let c = VideoConfig::default();
    let f = c.body_font();
    assert_eq!(f.family, "Inter");
    assert!(f.bold);
    assert_eq!(f.size_px, 48.0);
}

#[test]
fn empty_track_references_count_as_absent() {
    let mut c = VideoConfig::default();
    assert_eq!(c.voice_reference(), None);
    c.audio_url = Some(String::new());
    c.bg_music_url = Some(String::new());
    assert_eq!((c.voice_reference(), c.music_reference()), (None, None));
    c.audio_url = Some("voice.wav".into());
    c.bg_music_url = Some("music.mp3".into());
    assert_eq!(c.voice_reference(), Some("voice.wav"));
    assert_eq!(c.music_reference(), Some("music.mp3"));
}
