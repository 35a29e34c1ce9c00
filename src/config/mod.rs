//! Configuration snapshot consumed by every render tick.

pub(crate) mod color;
pub(crate) mod model;
