//! Export: container/codec selection, recorders, artifacts and the capture state machine.

pub(crate) mod artifact;
pub(crate) mod ffmpeg;
pub(crate) mod format;
pub(crate) mod pipeline;
pub(crate) mod recorder;
