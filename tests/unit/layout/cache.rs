use super::*;
use crate::layout::measure::FixedAdvanceMeasurer;

#[test]
fn identical_inputs_reuse_the_same_geometry() {
    let mut cache = LayoutCache::new();
    let mut m = FixedAdvanceMeasurer::default();
    let font = FontSpec::new("Inter", 48.0, false);

    let a = cache.get_or_layout("Hello\nWorld", &font, 800.0, 0, &mut m);
    let b = cache.get_or_layout("Hello\nWorld", &font, 800.0, 0, &mut m);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.recompute_count(), 1);
}

#[test]
fn any_key_change_recomputes() {
    let mut cache = LayoutCache::new();
    let mut m = FixedAdvanceMeasurer::default();
    let font = FontSpec::new("Inter", 48.0, false);

    let a = cache.get_or_layout("Hello", &font, 800.0, 0, &mut m);
    let b = cache.get_or_layout("Hello", &font, 800.0, 1, &mut m);
    assert!(!Arc::ptr_eq(&a, &b));
    let c = cache.get_or_layout("Hello", &font, 600.0, 1, &mut m);
    assert!(!Arc::ptr_eq(&b, &c));
    let bigger = FontSpec::new("Inter", 60.0, false);
    let d = cache.get_or_layout("Hello", &bigger, 600.0, 1, &mut m);
    assert!(!Arc::ptr_eq(&c, &d));
    let e = cache.get_or_layout("Hello!", &bigger, 600.0, 1, &mut m);
    assert!(!Arc::ptr_eq(&d, &e));
    assert_eq!(cache.recompute_count(), 5);
    assert!(Arc::ptr_eq(&cache.current().expect("entry"), &e));
}

#[test]
fn invalidate_forces_recompute() {
    let mut cache = LayoutCache::new();
    let mut m = FixedAdvanceMeasurer::default();
    let font = FontSpec::new("Inter", 10.0, false);
    let a = cache.get_or_layout("x", &font, 100.0, 0, &mut m);
    cache.invalidate();
    assert!(cache.current().is_none());
    let b = cache.get_or_layout("x", &font, 100.0, 0, &mut m);
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(*a, *b);
}
