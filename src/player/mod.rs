//! The interactive player: transport, export and overlay dragging around one configuration.

pub(crate) mod drag;
#[allow(clippy::module_inception)]
pub(crate) mod player;
