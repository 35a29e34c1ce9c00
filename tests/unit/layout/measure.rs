use super::*;

#[test]
fn from_css_takes_first_family_without_quotes() {
    let f = FontSpec::from_css("'Hind Siliguri', sans-serif", 36.0, true);
    assert_eq!(f.family, "Hind Siliguri");
    assert_eq!(f.size_px, 36.0);
    assert!(f.bold);

    assert_eq!(FontSpec::from_css("\"Inter\"", 12.0, false).family, "Inter");
    assert_eq!(FontSpec::from_css("  Roboto ", 12.0, false).family, "Roboto");
}

#[test]
fn fixed_advance_counts_chars_not_bytes() {
    let mut m = FixedAdvanceMeasurer::new(0.6);
    let f = FontSpec::new("X", 10.0, false);
    assert!((m.measure("abc", &f) - 18.0).abs() < 1e-9);
    assert!((m.measure("বাং", &f) - 18.0).abs() < 1e-9);
    assert_eq!(m.measure("", &f), 0.0);
}

#[test]
fn font_measurer_falls_back_without_faces() {
    let mut book = FontBook::new();
    let mut m = FontMeasurer::new(&mut book);
    let f = FontSpec::new("Inter", 20.0, true);
    assert_eq!(m.measure("abcd", &f), 40.0);
}
