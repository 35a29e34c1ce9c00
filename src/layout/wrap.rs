use crate::layout::measure::{FontSpec, TextMeasurer};

/// Emphasis marker emitted by script generators around highlighted words.
pub const EMPHASIS_MARKER: char = '*';

/// A contiguous word or whitespace run with its measured advance.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Exact run text.
    pub text: String,
    /// Advance width in pixels.
    pub width: f64,
}

impl Segment {
    /// Return `true` for whitespace-only runs.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// One output line: ordered segments plus their summed width.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    /// Segments in left-to-right order.
    pub segments: Vec<Segment>,
    /// Sum of segment widths.
    pub width: f64,
}

impl Line {
    fn push(&mut self, seg: Segment) {
        self.width += seg.width;
        self.segments.push(seg);
    }

    /// Return `true` for an explicit blank line.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated text of all segments.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Wrapped line geometry for a whole script.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineGeometry {
    /// Lines in top-to-bottom order.
    pub lines: Vec<Line>,
}

impl LineGeometry {
    /// Number of lines, blank lines included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Return `true` when there are no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total vertical extent for a line pitch of `line_height` pixels.
    pub fn total_height(&self, line_height: f64) -> f64 {
        self.lines.len() as f64 * line_height
    }
}

/// Remove emphasis markers; they are a display directive, not visible text.
pub fn strip_emphasis(script: &str) -> String {
    script.chars().filter(|&c| c != EMPHASIS_MARKER).collect()
}

/// Split a line into alternating whitespace and non-whitespace runs.
///
/// Concatenating the returned runs reproduces `line` exactly.
pub fn split_runs(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut current: Option<bool> = None;
    for (i, ch) in line.char_indices() {
        let ws = ch.is_whitespace();
        match current {
            Some(prev) if prev != ws => {
                out.push(&line[start..i]);
                start = i;
            }
            _ => {}
        }
        current = Some(ws);
    }
    if start < line.len() {
        out.push(&line[start..]);
    }
    out
}

/// Lay out `script` into wrapped lines no wider than `max_width` where possible.
///
/// - Emphasis markers are stripped first.
/// - Each source line (split on `\n`) wraps independently; an empty source line yields one line
///   with no segments.
/// - Wrapping is greedy. A word that would push a non-empty line past `max_width` starts a new
///   line; whitespace runs always stay on the line they follow. A single word wider than
///   `max_width` is placed alone on its line, never dropped.
#[tracing::instrument(level = "trace", skip(script, measurer), fields(len = script.len()))]
pub fn layout_script(
    script: &str,
    font: &FontSpec,
    max_width: f64,
    measurer: &mut dyn TextMeasurer,
) -> LineGeometry {
    let sanitized = strip_emphasis(script);
    let mut lines = Vec::new();

    for raw in sanitized.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.is_empty() {
            lines.push(Line::default());
            continue;
        }

        let mut current = Line::default();
        for run in split_runs(raw) {
            let seg = Segment {
                text: run.to_owned(),
                width: measurer.measure(run, font),
            };
            if !current.is_empty() && !seg.is_whitespace() && current.width + seg.width > max_width
            {
                lines.push(std::mem::take(&mut current));
            }
            current.push(seg);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    LineGeometry { lines }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
