use super::*;

#[test]
fn canvas_padding_and_wrap_width_follow_width() {
    let c = Canvas {
        width: 1920,
        height: 1080,
    };
    assert!((c.padding_x() - 96.0).abs() < 1e-9);
    assert!((c.wrap_width() - 1728.0).abs() < 1e-9);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_floor(1.01), 30);
    assert_eq!(fps.secs_to_frames_floor(-2.0), 0);
}

#[test]
fn premul_conversion_rounds() {
    let p = Rgba8::rgba(255, 128, 0, 128).to_premul();
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8::rgb(1, 2, 3).to_premul().to_array(), [1, 2, 3, 255]);
}

#[test]
fn opacity_scales_alpha_only() {
    let c = Rgba8::rgb(10, 20, 30).with_opacity(0.5);
    assert_eq!((c.r, c.g, c.b), (10, 20, 30));
    assert_eq!(c.a, 128);
    assert_eq!(Rgba8::rgb(1, 1, 1).with_opacity(f32::NAN).a, 0);
}
