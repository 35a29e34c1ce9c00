use super::*;
use crate::layout::measure::FixedAdvanceMeasurer;

fn font() -> FontSpec {
    FontSpec::new("Inter", 10.0, false)
}

fn layout(script: &str, max: f64) -> LineGeometry {
    // 5px per character at size 10
    layout_script(script, &font(), max, &mut FixedAdvanceMeasurer::default())
}

#[test]
fn split_runs_alternates_and_reconcatenates() {
    let runs = split_runs("  hello  world ");
    assert_eq!(runs, vec!["  ", "hello", "  ", "world", " "]);
    assert_eq!(runs.concat(), "  hello  world ");
    assert!(split_runs("").is_empty());
}

#[test]
fn emphasis_markers_are_removed() {
    assert_eq!(strip_emphasis("a **bold** word*"), "a bold word");
    let g = layout("**Hi**", 1000.0);
    assert_eq!(g.lines[0].text(), "Hi");
}

#[test]
fn blank_source_lines_are_preserved() {
    let g = layout("A\n\nB", 1000.0);
    assert_eq!(g.len(), 3);
    assert_eq!(g.lines[0].text(), "A");
    assert!(g.lines[1].is_empty());
    assert_eq!(g.lines[1].width, 0.0);
    assert_eq!(g.lines[2].text(), "B");
}

#[test]
fn crlf_line_endings_are_normalized() {
    let g = layout("A\r\nB", 1000.0);
    assert_eq!(g.len(), 2);
    assert_eq!(g.lines[0].text(), "A");
}

#[test]
fn greedy_wrap_respects_max_width() {
    // "aaaa bbbb cccc": words 20px, spaces 5px
    let g = layout("aaaa bbbb cccc", 50.0);
    for line in &g.lines {
        assert!(line.width <= 50.0, "line {:?} too wide", line.text());
    }
    let joined: String = g.lines.iter().map(Line::text).collect();
    assert_eq!(joined, "aaaa bbbb cccc");
    assert_eq!(g.lines[0].text(), "aaaa bbbb ");
    assert_eq!(g.lines[1].text(), "cccc");
}

#[test]
fn overflowing_whitespace_stays_on_the_previous_line() {
    let g = layout("aaaa bbbb", 22.0);
    let texts: Vec<String> = g.lines.iter().map(Line::text).collect();
    assert_eq!(texts, vec!["aaaa ", "bbbb"]);

    let g = layout("aaaa    bbbb", 22.0);
    let texts: Vec<String> = g.lines.iter().map(Line::text).collect();
    assert_eq!(texts, vec!["aaaa    ", "bbbb"]);
    assert!(g.lines.iter().all(|l| !l.text().starts_with(' ')));
}

#[test]
fn oversized_word_sits_alone_and_is_kept() {
    let g = layout("hi supercalifragilistic yo", 40.0);
    let long = g
        .lines
        .iter()
        .find(|l| l.text().contains("supercalifragilistic"))
        .expect("long word kept");
    assert_eq!(
        long.segments.iter().filter(|s| !s.is_whitespace()).count(),
        1
    );
    assert!(long.width > 40.0);
    assert!(g.lines.iter().all(|l| !l.is_empty()));
}

#[test]
fn line_width_is_sum_of_segments() {
    let g = layout("one two  three", 1000.0);
    let line = &g.lines[0];
    let sum: f64 = line.segments.iter().map(|s| s.width).sum();
    assert_eq!(line.width, sum);
    assert_eq!(line.width, 14.0 * 5.0);
}

#[test]
fn total_height_counts_blank_lines() {
    let g = layout("Hello\nWorld", 1000.0);
    assert_eq!(g.total_height(72.0), 144.0);
    assert_eq!(layout("a\n\n\nb", 1000.0).total_height(10.0), 40.0);
}
