//! Scroll speed derivation and the authoritative playback clock.

pub(crate) mod controller;
pub(crate) mod speed;
