use super::*;

#[test]
fn manual_speed_is_used_verbatim() {
    assert_eq!(effective_scroll_speed(false, 50.0, 144.0, 1080.0, Some(3.0)), 50.0);
    assert_eq!(effective_scroll_speed(true, 42.0, 144.0, 1080.0, None), 42.0);
}

#[test]
fn auto_speed_fits_voice_duration() {
    let s = effective_scroll_speed(true, 50.0, 144.0, 1080.0, Some(12.24));
    assert!((s - 100.0).abs() < 1e-9);
}

#[test]
fn auto_speed_is_floored() {
    // 1224 px over an hour is far below the floor.
    assert_eq!(
        effective_scroll_speed(true, 50.0, 144.0, 1080.0, Some(3600.0)),
        MIN_AUTO_SCROLL_SPEED
    );
}

#[test]
fn degenerate_durations_clamp_to_exactly_the_floor() {
    for d in [0.0, f64::MIN_POSITIVE, 1e-300, 5e-324, -1.0, f64::NAN, f64::INFINITY] {
        let s = effective_scroll_speed(true, 50.0, 144.0, 1080.0, Some(d));
        assert_eq!(s, MIN_AUTO_SCROLL_SPEED, "duration {d}");
    }
}

#[test]
fn max_duration_prefers_voice() {
    assert_eq!(max_duration(Some(5.0), 144.0, 1080.0, 50.0), 5.0);
    assert!((max_duration(None, 144.0, 1080.0, 50.0) - 24.48).abs() < 1e-9);
    assert!((max_duration(Some(0.0), 144.0, 1080.0, 0.0) - 24.48).abs() < 1e-9);
}

#[test]
fn metrics_for_hello_world() {
    let config = VideoConfig::default().edit(|c| {
        c.script = "Hello\nWorld".into();
        c.font_size = 48.0;
        c.line_height = 1.5;
        c.scroll_speed = 50.0;
    });
    let m = ScrollMetrics::compute(&config, 2, None);
    assert_eq!(m.text_height, 144.0);
    assert_eq!(m.canvas_height, 1080.0);
    assert_eq!(m.speed, 50.0);
    assert!((m.max_duration - 24.48).abs() < 1e-9);
    assert_eq!(m.scroll_distance(), 1224.0);
}
