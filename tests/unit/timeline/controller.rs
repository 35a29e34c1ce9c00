use super::*;
use crate::foundation::clock::{Clock, ManualClock};
use crate::media::pcm::PcmTrack;

#[test]
fn wall_clock_accumulates_without_voice() {
    let mut tl = TimelineController::new();
    assert!(tl.start_playing(100.0, None));
    assert_eq!(tl.tick(100.5, None).time, 0.5);
    assert_eq!(tl.tick(101.0, None).time, 1.0);
    // Clock going backwards never rewinds the timeline.
    assert_eq!(tl.tick(100.0, None).time, 1.0);
}

#[test]
fn idle_ticks_do_not_advance() {
    let mut tl = TimelineController::new();
    tl.seek(3.0);
    assert_eq!(tl.tick(50.0, None).time, 3.0);
    assert_eq!(tl.mode(), Mode::Idle);
}

#[test]
fn pause_resume_skips_the_paused_interval() {
    let mut tl = TimelineController::new();
    tl.start_playing(0.0, None);
    tl.tick(2.0, None);
    tl.stop();
    tl.start_playing(10.0, None);
    assert_eq!(tl.tick(11.0, None).time, 3.0);
}

#[test]
fn ready_voice_is_the_source_of_truth() {
    let (clock, shared) = ManualClock::shared(0.0);
    let mut voice = PcmTrack::silent(5.0, shared);
    let mut tl = TimelineController::new();

    assert!(tl.start_playing(clock.now(), Some(&voice)));
    voice.play().unwrap();
    clock.advance(1.25);
    // Wall-clock argument is ignored when the voice drives.
    let out = tl.tick(999.0, Some(&voice));
    assert!((out.time - 1.25).abs() < 1e-9);
    assert!(!out.voice_ended);
}

#[test]
fn voice_end_stops_preview_but_not_export() {
    let (clock, shared) = ManualClock::shared(0.0);
    let mut voice = PcmTrack::silent(2.0, shared);

    let mut tl = TimelineController::new();
    tl.start_playing(0.0, Some(&voice));
    voice.play().unwrap();
    clock.advance(2.5);
    let out = tl.tick(clock.now(), Some(&voice));
    assert!(out.voice_ended);
    assert_eq!(tl.mode(), Mode::Idle);

    let mut tl = TimelineController::new();
    tl.begin_export(clock.now());
    let out = tl.tick(clock.now(), Some(&voice));
    assert!(out.voice_ended);
    assert_eq!(tl.mode(), Mode::Exporting);
}

#[test]
fn errored_voice_closes_the_gate_and_falls_back_to_wall_clock() {
    let (_clock, shared) = ManualClock::shared(0.0);
    let voice = PcmTrack::failed("bad file", shared);
    assert!(!TimelineController::can_play(Some(&voice)));

    let mut tl = TimelineController::new();
    assert!(!tl.start_playing(0.0, Some(&voice)));
    assert_eq!(tl.mode(), Mode::Idle);

    tl.begin_export(0.0);
    assert_eq!(tl.tick(0.75, Some(&voice)).time, 0.75);
}

#[test]
fn begin_export_resets_time_and_blocks_play() {
    let mut tl = TimelineController::new();
    tl.seek(12.0);
    tl.begin_export(5.0);
    assert_eq!(tl.current_time(), 0.0);
    assert!(!tl.start_playing(5.0, None));
    assert_eq!(tl.mode(), Mode::Exporting);
}

#[test]
fn seek_sanitizes_input() {
    let mut tl = TimelineController::new();
    tl.seek(-4.0);
    assert_eq!(tl.current_time(), 0.0);
    tl.seek(f64::NAN);
    assert_eq!(tl.current_time(), 0.0);
}
