use super::*;

const LISTING: &str = "Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libvpx-vp9           libvpx VP9 (codec vp9)
 V....D mpeg4                MPEG-4 part 2
 A....D aac                  AAC (Advanced Audio Coding)
 A....D libopus              libopus Opus (codec opus)
";

#[test]
fn parse_reads_only_the_table() {
    let caps = FfmpegCapabilities::parse(LISTING);
    assert!(caps.has_encoder("libvpx-vp9"));
    assert!(caps.has_encoder("aac"));
    assert!(!caps.has_encoder("="));
    assert!(!caps.has_encoder("Video"));
    assert!(!caps.has_encoder("libx264"));
}

#[test]
fn preference_order_is_respected() {
    assert_eq!(select_format(&StaticSupport::all()), MP4_H264_AAC);
    // No libx264: plain mp4 (mpeg4 + aac) wins over webm.
    assert_eq!(select_format(&FfmpegCapabilities::parse(LISTING)), MP4_DEFAULT);
    assert_eq!(
        select_format(&StaticSupport::new(&[WEBM_VP9_OPUS, WEBM_DEFAULT])),
        WEBM_VP9_OPUS
    );
}

#[test]
fn nothing_supported_falls_back_to_minimal_webm() {
    assert_eq!(select_format(&StaticSupport::none()), WEBM_DEFAULT);
}

#[test]
fn extensions_follow_the_container() {
    assert_eq!(MP4_H264_AAC.extension(), "mp4");
    assert_eq!(MP4_DEFAULT.extension(), "mp4");
    assert_eq!(WEBM_VP9_OPUS.extension(), "webm");
    assert_eq!(WEBM_DEFAULT.extension(), "webm");
}
