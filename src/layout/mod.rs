//! Script text layout: emphasis stripping, whitespace-preserving segmentation and greedy wrap.

pub(crate) mod cache;
pub(crate) mod measure;
pub(crate) mod wrap;
