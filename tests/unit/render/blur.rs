use super::*;

fn full(w: u32, h: u32) -> Region {
    Region {
        x0: 0,
        y0: 0,
        x1: w,
        y1: h,
    }
}

#[test]
fn radius_zero_is_identity() {
    let mut buf = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    blur_region_in_place(&mut buf, 1, 2, full(1, 2), 0, 1.0).unwrap();
    assert_eq!(buf, vec![1u8, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 40u8];
    let mut buf = px.repeat((w * h) as usize);
    blur_region_in_place(&mut buf, w, h, full(w, h), 3, 2.0).unwrap();
    assert_eq!(buf, px.repeat((w * h) as usize));
}

#[test]
fn single_pixel_spreads_and_conserves_energy() {
    let (w, h) = (7u32, 7u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let center = ((3 * w + 3) * 4) as usize;
    buf[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    blur_region_in_place(&mut buf, w, h, full(w, h), 2, 1.2).unwrap();

    let nonzero = buf.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    let sum_a: u32 = buf.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn pixels_outside_the_region_are_untouched() {
    let (w, h) = (6u32, 1u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    buf[0..4].copy_from_slice(&[200, 200, 200, 200]);
    buf[20..24].copy_from_slice(&[50, 50, 50, 50]);
    let region = Region {
        x0: 2,
        y0: 0,
        x1: 5,
        y1: 1,
    };
    blur_region_in_place(&mut buf, w, h, region, 2, 1.0).unwrap();
    assert_eq!(&buf[0..4], &[200, 200, 200, 200]);
    assert_eq!(&buf[20..24], &[50, 50, 50, 50]);
}

#[test]
fn bad_inputs_are_rejected() {
    let mut buf = vec![0u8; 8];
    assert!(blur_region_in_place(&mut buf, 3, 3, full(3, 3), 1, 1.0).is_err());
    let mut buf = vec![0u8; 4];
    assert!(blur_region_in_place(&mut buf, 1, 1, full(1, 1), 1, 0.0).is_err());
}
