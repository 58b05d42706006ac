//! Filter-style raster stages: brightness/contrast/saturate, gaussian blur, unsharp mask and
//! constant-color blend fills.

use rayon::prelude::*;

use crate::foundation::core::Raster;
use crate::foundation::math::lerp;
use crate::foundation::pixels::map_rgb;

/// Multiplicative filter factors; `1.0` is neutral for each.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterFactors {
    /// Brightness multiplier.
    pub brightness: f32,
    /// Contrast multiplier around mid-gray.
    pub contrast: f32,
    /// Saturation multiplier (0 = grayscale).
    pub saturate: f32,
}

impl Default for FilterFactors {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturate: 1.0,
        }
    }
}

impl FilterFactors {
    /// `true` when every factor is exactly neutral.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Apply brightness, contrast, then saturate to one straight RGB pixel.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let b = self.brightness;
        let c = self.contrast;
        let mut v = rgb.map(|x| ((x * b - 0.5) * c + 0.5).clamp(0.0, 1.0));
        if self.saturate != 1.0 {
            v = saturate(v, self.saturate);
        }
        v
    }
}

/// Luminance-preserving saturation matrix (the CSS `saturate()` filter).
pub fn saturate(rgb: [f32; 3], s: f32) -> [f32; 3] {
    let [r, g, b] = rgb;
    [
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    ]
    .map(|x| x.clamp(0.0, 1.0))
}

/// Apply [`FilterFactors`] in place. No-op for identity factors.
pub fn apply_filter_factors(raster: &mut Raster, f: FilterFactors, parallel: bool) {
    if f.is_identity() {
        return;
    }
    map_rgb(raster, parallel, |_, rgb| f.apply(rgb));
}

/// Separable gaussian blur over premultiplied pixels; edges clamp.
///
/// Non-positive or non-finite `sigma` returns an unchanged copy.
pub fn gaussian_blur(src: &Raster, sigma: f32, parallel: bool) -> Raster {
    if !sigma.is_finite() || sigma <= 0.0 {
        return src.clone();
    }
    let radius = (sigma * 3.0).ceil().max(1.0) as u32;
    let kernel = gaussian_kernel_q16(radius, sigma);
    let mut tmp = vec![0u8; src.data.len()];
    let mut out = vec![0u8; src.data.len()];
    horizontal_pass(&src.data, &mut tmp, src.width, &kernel, parallel);
    vertical_pass(&tmp, &mut out, src.width, src.height, &kernel, parallel);
    Raster {
        width: src.width,
        height: src.height,
        data: out,
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> Vec<u32> {
    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
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
    // Push rounding error into the center tap so the kernel sums to exactly 1.0 (q16).
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }
    weights
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32], parallel: bool) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let row_len = (width as usize) * 4;
    let row = |(y, out): (usize, &mut [u8])| {
        let line = &src[y * row_len..(y + 1) * row_len];
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = (sx as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(line[idx + c]);
                }
            }
            let o = (x as usize) * 4;
            for c in 0..4 {
                out[o + c] = q16_to_u8(acc[c]);
            }
        }
    };
    if parallel {
        dst.par_chunks_exact_mut(row_len).enumerate().for_each(row);
    } else {
        dst.chunks_exact_mut(row_len).enumerate().for_each(row);
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], parallel: bool) {
    let radius = (k.len() / 2) as i32;
    let h = height as i32;
    let row_len = (width as usize) * 4;
    let row = |(y, out): (usize, &mut [u8])| {
        for x in 0..width as usize {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1);
                let idx = (sy as usize) * row_len + x * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            for c in 0..4 {
                out[x * 4 + c] = q16_to_u8(acc[c]);
            }
        }
    };
    if parallel {
        dst.par_chunks_exact_mut(row_len).enumerate().for_each(row);
    } else {
        dst.chunks_exact_mut(row_len).enumerate().for_each(row);
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

/// Unsharp mask: `c + amount * (c - blur(c, sigma))`, per premultiplied channel.
pub fn unsharp_mask(raster: &mut Raster, amount: f32, sigma: f32, parallel: bool) {
    if amount <= 0.0 {
        return;
    }
    let blurred = gaussian_blur(raster, sigma, parallel);
    let sharpen = |(d, s): (&mut [u8], &[u8])| {
        let a = f32::from(d[3]);
        for c in 0..3 {
            let v = f32::from(d[c]);
            let out = v + amount * (v - f32::from(s[c]));
            d[c] = out.round().clamp(0.0, a) as u8;
        }
    };
    if parallel {
        raster
            .data
            .par_chunks_exact_mut(4)
            .zip(blurred.data.par_chunks_exact(4))
            .for_each(sharpen);
    } else {
        raster
            .data
            .chunks_exact_mut(4)
            .zip(blurred.data.chunks_exact(4))
            .for_each(sharpen);
    }
}

/// W3C overlay blend of one channel.
pub fn overlay_channel(cb: f32, cs: f32) -> f32 {
    if cb <= 0.5 {
        2.0 * cb * cs
    } else {
        1.0 - 2.0 * (1.0 - cb) * (1.0 - cs)
    }
}

/// W3C soft-light blend of one channel.
pub fn soft_light_channel(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        let d = if cb <= 0.25 {
            ((16.0 * cb - 12.0) * cb + 4.0) * cb
        } else {
            cb.sqrt()
        };
        cb + (2.0 * cs - 1.0) * (d - cb)
    }
}

/// Blend a constant color over the raster with `mode`, mixed in at `alpha`.
pub fn blend_fill(
    raster: &mut Raster,
    color: [f32; 3],
    alpha: f32,
    mode: FillBlend,
    parallel: bool,
) {
    if alpha <= 0.0 {
        return;
    }
    let alpha = alpha.min(1.0);
    map_rgb(raster, parallel, |_, rgb| {
        let mut out = [0.0; 3];
        for c in 0..3 {
            let blended = match mode {
                FillBlend::Overlay => overlay_channel(rgb[c], color[c]),
                FillBlend::SoftLight => soft_light_channel(rgb[c], color[c]),
                FillBlend::Multiply => rgb[c] * color[c],
                FillBlend::Add => (rgb[c] + color[c]).min(1.0),
            };
            out[c] = lerp(rgb[c], blended, alpha);
        }
        out
    });
}

/// Blend modes used by constant-color fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillBlend {
    /// W3C overlay.
    Overlay,
    /// W3C soft-light.
    SoftLight,
    /// Multiply.
    Multiply,
    /// Additive lighten (canvas `lighter`).
    Add,
}

/// Darken toward black with a centered radial falloff.
///
/// Outer radius is half the diagonal; darkening starts at `(1 - amount/100) * outer` and reaches
/// `0.8 * amount/100` at the outer radius.
pub fn vignette(raster: &mut Raster, amount: f32, parallel: bool) {
    if amount <= 0.0 {
        return;
    }
    let w = raster.width as usize;
    let cx = raster.width as f32 / 2.0;
    let cy = raster.height as f32 / 2.0;
    let outer = (cx * cx + cy * cy).sqrt();
    let inner = (1.0 - amount / 100.0) * outer;
    let edge_alpha = 0.8 * amount / 100.0;
    map_rgb(raster, parallel, |i, rgb| {
        let x = (i % w) as f32 + 0.5;
        let y = (i / w) as f32 + 0.5;
        let d = ((x - cx) * (x - cx) + (y - cy) * (y - cy)).sqrt();
        let t = if d <= inner {
            0.0
        } else if outer <= inner {
            1.0
        } else {
            ((d - inner) / (outer - inner)).min(1.0)
        };
        let k = 1.0 - edge_alpha * t;
        rgb.map(|c| c * k)
    });
}

#[cfg(test)]
#[path = "../../tests/unit/adjust/filters.rs"]
mod tests;
