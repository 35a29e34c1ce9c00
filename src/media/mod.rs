//! Playable media elements: transport state, playback clock and PCM access.

pub(crate) mod decode;
pub(crate) mod element;
pub(crate) mod pcm;
