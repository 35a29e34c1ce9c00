//! Drawing surfaces and the frame compositor.

pub(crate) mod blur;
pub(crate) mod compositor;
pub(crate) mod cpu;
pub(crate) mod recording;
pub(crate) mod surface;
