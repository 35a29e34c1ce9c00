use super::*;
use crate::capture::artifact::MemoryDownloads;
use crate::capture::recorder::InMemoryRecorderFactory;
use crate::foundation::core::Fps;
use crate::render::recording::RecordingSurface;

fn pipeline(factory: InMemoryRecorderFactory) -> (ExportPipeline, MemoryDownloads) {
    let downloads = MemoryDownloads::new();
    let p = ExportPipeline::new(Box::new(factory), Box::new(downloads.clone()));
    (p, downloads)
}

fn settings() -> RecorderSettings {
    RecorderSettings::new(8, 4, Fps::new(30, 1).unwrap())
}

#[test]
fn phases_advance_through_settle_and_warm_up() {
    let (mut p, _) = pipeline(InMemoryRecorderFactory::new());
    p.begin(10.0).unwrap();
    assert!(p.begin(10.0).is_err());
    assert_eq!(p.poll(10.2), ExportStep::Wait);
    assert_eq!(p.poll(10.3), ExportStep::StartPlayback);
    assert_eq!(p.poll(10.5), ExportStep::Wait);
    assert_eq!(p.poll(10.61), ExportStep::StartRecording);
    p.start_recording(10.6, &settings(), Completion::VoiceEnd).unwrap();
    assert!(p.is_recording());
    assert_eq!(p.poll(11.0), ExportStep::Wait);
}

#[test]
fn frames_are_pushed_per_elapsed_slot() {
    let factory = InMemoryRecorderFactory::new();
    let downloads = MemoryDownloads::new();
    let mut surface = RecordingSurface::new(8, 4);
    let mut p = ExportPipeline::new(Box::new(factory), Box::new(downloads));
    p.begin(0.0).unwrap();
    p.start_recording(0.0, &settings(), Completion::Timeout(2.0)).unwrap();
    assert_eq!(p.capture_frames(0.0, &mut surface, 30.0).unwrap(), 1);
    assert_eq!(p.capture_frames(0.01, &mut surface, 30.0).unwrap(), 0);
    // 0.1 s at 30 fps covers slots 0..=3.
    assert_eq!(p.capture_frames(0.1, &mut surface, 30.0).unwrap(), 3);
    assert_eq!(surface.frames_read(), 2);
}

#[test]
fn voice_gated_completion_waits_for_end() {
    let (mut p, downloads) = pipeline(InMemoryRecorderFactory::new());
    p.begin(0.0).unwrap();
    p.start_recording(0.6, &settings(), Completion::for_export(true, 5.0)).unwrap();
    assert!(!p.should_finish(100.0, false));
    assert!(p.should_finish(5.6, true));
    let name = p.finish().unwrap().unwrap();
    assert!(name.starts_with("scrollvision-") && name.ends_with(".mp4"));
    assert_eq!(downloads.len(), 1);
    assert!(!p.is_active());
    assert_eq!(p.delivered(), 1);
}

#[test]
fn timeout_completion_adds_margin() {
    assert_eq!(Completion::for_export(false, 24.48), Completion::Timeout(25.48));
    let (mut p, _) = pipeline(InMemoryRecorderFactory::new());
    p.begin(0.0).unwrap();
    p.start_recording(1.0, &settings(), Completion::Timeout(3.0)).unwrap();
    assert!(!p.should_finish(3.9, true));
    assert!(p.should_finish(4.0, false));
}

#[test]
fn construction_failure_returns_to_idle_with_message() {
    let (mut p, downloads) = pipeline(InMemoryRecorderFactory::failing());
    p.begin(0.0).unwrap();
    assert!(p.start_recording(0.6, &settings(), Completion::VoiceEnd).is_err());
    assert_eq!(p.phase(), ExportPhase::Idle);
    assert!(p.last_error().unwrap().starts_with("Recording failed"));
    assert_eq!(p.finish().unwrap(), None);
    assert!(downloads.is_empty());
}

#[test]
fn cancel_stops_the_recorder_without_delivering() {
    let factory = InMemoryRecorderFactory::new();
    let (mut p, downloads) = pipeline(factory.clone());
    p.begin(0.0).unwrap();
    p.start_recording(0.0, &settings(), Completion::VoiceEnd).unwrap();
    assert!(factory.stats().recording);
    p.cancel();
    assert!(!p.is_active());
    assert!(!factory.stats().recording);
    assert_eq!(factory.stats().stops, 1);
    assert!(downloads.is_empty());
}

#[test]
fn audio_is_forwarded_only_while_recording() {
    let factory = InMemoryRecorderFactory::new();
    let (mut p, _) = pipeline(factory.clone());
    p.push_audio(&[0.5; 4]).unwrap();
    p.begin(0.0).unwrap();
    p.start_recording(0.0, &settings(), Completion::VoiceEnd).unwrap();
    p.push_audio(&[]).unwrap();
    p.push_audio(&[0.5; 4]).unwrap();
    assert_eq!(factory.stats().audio_samples, 4);
}

#[test]
fn abort_keeps_the_first_failure_message() {
    let factory = InMemoryRecorderFactory::new();
    let (mut p, _) = pipeline(factory.clone());
    p.begin(0.0).unwrap();
    let msg = p.abort(&ScrollError::export("voice playback could not start"));
    assert_eq!(msg, "Recording failed: export error: voice playback could not start");
    assert!(!p.is_active());

    let (mut p, _) = pipeline(InMemoryRecorderFactory::failing());
    p.begin(0.0).unwrap();
    let err = p.start_recording(0.6, &settings(), Completion::VoiceEnd).unwrap_err();
    let first = p.last_error().unwrap().to_owned();
    assert_eq!(p.abort(&err), first);
}
