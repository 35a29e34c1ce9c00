use std::sync::Arc;

use crate::layout::measure::{FontSpec, TextMeasurer};
use crate::layout::wrap::{LineGeometry, layout_script};

#[derive(Clone, Debug, PartialEq)]
struct LayoutKey {
    script: String,
    font: FontSpec,
    max_width: f64,
    font_epoch: u64,
}

/// Memoizes the most recent script layout.
///
/// Layout is recomputed only when the script, font, wrap width or font epoch change; otherwise the
/// same `Arc<LineGeometry>` is handed back so callers can detect reuse with `Arc::ptr_eq`.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entry: Option<(LayoutKey, Arc<LineGeometry>)>,
    recomputes: u64,
}

impl LayoutCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the layout for the given inputs, recomputing on any key change.
    pub fn get_or_layout(
        &mut self,
        script: &str,
        font: &FontSpec,
        max_width: f64,
        font_epoch: u64,
        measurer: &mut dyn TextMeasurer,
    ) -> Arc<LineGeometry> {
        if let Some((key, geom)) = &self.entry
            && key.font_epoch == font_epoch
            && key.max_width == max_width
            && key.font == *font
            && key.script == script
        {
            return Arc::clone(geom);
        }

        let geom = Arc::new(layout_script(script, font, max_width, measurer));
        self.recomputes += 1;
        tracing::debug!(
            lines = geom.len(),
            max_width,
            font_epoch,
            "script layout recomputed"
        );
        self.entry = Some((
            LayoutKey {
                script: script.to_owned(),
                font: font.clone(),
                max_width,
                font_epoch,
            },
            Arc::clone(&geom),
        ));
        geom
    }

    /// Most recent layout, if any.
    pub fn current(&self) -> Option<Arc<LineGeometry>> {
        self.entry.as_ref().map(|(_, g)| Arc::clone(g))
    }

    /// Number of layouts computed so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Drop the cached entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cache.rs"]
mod tests;
