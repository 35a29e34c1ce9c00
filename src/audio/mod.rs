//! Audio routing: per-source monitor and capture paths with independently ramped gains.

pub(crate) mod gain;
pub(crate) mod graph;
