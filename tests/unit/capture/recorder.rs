use super::*;
use crate::capture::format::{MP4_H264_AAC, WEBM_VP9_OPUS};

fn settings() -> RecorderSettings {
    RecorderSettings::new(4, 2, Fps::new(30, 1).unwrap())
}

fn frame(w: u32, h: u32) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![0; (w * h * 4) as usize],
        premultiplied: true,
    }
}

#[test]
fn settings_carry_fixed_bitrates() {
    let s = settings();
    assert_eq!(s.video_bits_per_second, 12_000_000);
    assert_eq!(s.audio_bits_per_second, 320_000);
    assert_eq!(s.sample_rate, MIX_SAMPLE_RATE);
}

#[test]
fn chunks_come_back_in_emission_order() {
    let mut rec = InMemoryRecorder::new(MP4_H264_AAC, settings());
    assert_eq!(rec.state(), RecorderState::Inactive);
    rec.start().unwrap();
    rec.push_video(&frame(4, 2)).unwrap();
    rec.push_audio(&[0.0; 8]).unwrap();
    rec.push_video(&frame(4, 2)).unwrap();
    let chunks = rec.stop().unwrap();
    assert_eq!(rec.state(), RecorderState::Stopped);
    assert_eq!(chunks.len(), 4);
    assert!(chunks[0].starts_with(b"SVREC"));
    assert_eq!(chunks[1][0], b'V');
    assert_eq!(chunks[1][1..], 0u64.to_le_bytes());
    assert_eq!(chunks[2][0], b'A');
    assert_eq!(chunks[3][1..], 1u64.to_le_bytes());
}

#[test]
fn pushing_before_start_or_with_wrong_size_fails() {
    let mut rec = InMemoryRecorder::new(MP4_H264_AAC, settings());
    assert!(rec.push_video(&frame(4, 2)).is_err());
    rec.start().unwrap();
    assert!(rec.start().is_err());
    assert!(rec.push_video(&frame(2, 2)).is_err());
}

#[test]
fn stop_twice_yields_nothing_the_second_time() {
    let mut rec = InMemoryRecorder::new(MP4_H264_AAC, settings());
    rec.start().unwrap();
    assert!(!rec.stop().unwrap().is_empty());
    assert!(rec.stop().unwrap().is_empty());
}

#[test]
fn factory_shares_stats_across_recorders() {
    let factory = InMemoryRecorderFactory::new();
    let mut rec = create_preferred(&factory, &settings()).unwrap();
    assert_eq!(rec.format(), MP4_H264_AAC);
    rec.start().unwrap();
    rec.push_video(&frame(4, 2)).unwrap();
    assert!(factory.stats().recording);
    rec.stop().unwrap();
    let stats = factory.stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.starts, 1);
    assert_eq!(stats.stops, 1);
    assert_eq!(stats.video_frames, 1);
    assert!(!stats.recording);
}

#[test]
fn preferred_creation_honors_support() {
    let factory = InMemoryRecorderFactory::with_support(StaticSupport::new(&[WEBM_VP9_OPUS]));
    let rec = create_preferred(&factory, &settings()).unwrap();
    assert_eq!(rec.format(), WEBM_VP9_OPUS);

    let factory = InMemoryRecorderFactory::with_support(StaticSupport::none());
    let rec = create_preferred(&factory, &settings()).unwrap();
    assert_eq!(rec.format(), WEBM_DEFAULT);
}

#[test]
fn construction_failure_is_an_export_error() {
    let factory = InMemoryRecorderFactory::failing();
    let err = create_preferred(&factory, &settings()).err().unwrap();
    assert!(matches!(err, ScrollError::Export(_)));
    assert!(err.to_string().starts_with("export error:"));
    assert_eq!(factory.stats().created, 0);
}
