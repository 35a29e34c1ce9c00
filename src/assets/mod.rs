//! Image decoding, asset reference resolution and font registration.

pub(crate) mod decode;
pub(crate) mod fonts;
pub(crate) mod loader;
