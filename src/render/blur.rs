use crate::foundation::error::{ScrollError, ScrollResult};

/// Pixel region `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Region {
    pub(crate) x0: u32,
    pub(crate) y0: u32,
    pub(crate) x1: u32,
    pub(crate) y1: u32,
}

impl Region {
    pub(crate) fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub(crate) fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub(crate) fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Gaussian-blur a premultiplied RGBA8 buffer in place, limited to `region`.
///
/// Pixels outside the region are read as edge-clamped copies of the region border, so the region
/// should include a margin of at least `radius` around any non-transparent content.
pub(crate) fn blur_region_in_place(
    buf: &mut [u8],
    width: u32,
    height: u32,
    region: Region,
    radius: u32,
    sigma: f32,
) -> ScrollResult<()> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ScrollError::validation("blur buffer size overflow"))?;
    if buf.len() != expected_len {
        return Err(ScrollError::validation(
            "blur expects a buffer matching width*height*4",
        ));
    }
    let region = Region {
        x0: region.x0.min(width),
        y0: region.y0.min(height),
        x1: region.x1.min(width),
        y1: region.y1.min(height),
    };
    if radius == 0 || region.is_empty() {
        return Ok(());
    }

    let (rw, rh) = (region.width(), region.height());
    let row_bytes = rw as usize * 4;
    let mut src = vec![0u8; row_bytes * rh as usize];
    for y in 0..rh as usize {
        let off = ((region.y0 as usize + y) * width as usize + region.x0 as usize) * 4;
        src[y * row_bytes..(y + 1) * row_bytes].copy_from_slice(&buf[off..off + row_bytes]);
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; src.len()];
    horizontal_pass(&src, &mut tmp, rw, rh, &kernel);
    vertical_pass(&tmp, &mut src, rw, rh, &kernel);

    for y in 0..rh as usize {
        let off = ((region.y0 as usize + y) * width as usize + region.x0 as usize) * 4;
        buf[off..off + row_bytes].copy_from_slice(&src[y * row_bytes..(y + 1) * row_bytes]);
    }
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ScrollResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ScrollError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
