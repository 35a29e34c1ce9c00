use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn premul_over_opaque_replaces_and_transparent_keeps() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 0]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
    premul_over_in_place(&mut dst, &[1, 2, 3, 255]);
    assert_eq!(dst, vec![1, 2, 3, 255]);
}

#[test]
fn premul_over_half_alpha_blends() {
    let mut dst = vec![0u8, 0, 255, 255];
    premul_over_in_place(&mut dst, &[128, 0, 0, 128]);
    assert_eq!(dst, vec![128, 0, 127, 255]);
}

#[test]
fn wrap_stays_in_range() {
    assert!((wrap_f64(5.5, 2.0) - 1.5).abs() < 1e-12);
    assert!((wrap_f64(-0.5, 2.0) - 1.5).abs() < 1e-12);
    assert_eq!(wrap_f64(3.0, 0.0), 0.0);
    assert_eq!(wrap_f64(f64::INFINITY, 2.0), 0.0);
}
