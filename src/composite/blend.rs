use rayon::prelude::*;

use crate::foundation::core::Raster;
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::math::mul_div255_u8;
use crate::mask::builder::AlphaMask;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Per-channel interpolation `d + (s - d) * m`.
///
/// Equal inputs return `d` exactly for any `m`; `m <= 0` returns `d`, `m >= 1` returns `s`.
pub fn lerp_px(d: PremulRgba8, s: PremulRgba8, m: f32) -> PremulRgba8 {
    if m <= 0.0 || d == s {
        return d;
    }
    if m >= 1.0 {
        return s;
    }
    let mut out = [0u8; 4];
    for i in 0..4 {
        let dv = f32::from(d[i]);
        let sv = f32::from(s[i]);
        out[i] = (dv + (sv - dv) * m).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Premultiplied source-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = 255u16 - u16::from(sa);
            let mut out = [0u8; 4];
            for i in 0..4 {
                let dc = mul_div255_u8(u16::from(dst[i]), inv);
                out[i] = src[i].saturating_add(dc);
            }
            out
        }
    }
}

/// Composite `src` over `dst` in place.
pub fn over_in_place(dst: &mut Raster, src: &Raster) -> RetouchResult<()> {
    if dst.width != src.width || dst.height != src.height || dst.data.len() != src.data.len() {
        return Err(RetouchError::validation(
            "over_in_place expects equal-size rasters",
        ));
    }
    for (d, s) in dst.data.chunks_exact_mut(4).zip(src.data.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Blend `src` into `dst` weighted by `mask`, in place.
pub fn mask_lerp_in_place(
    dst: &mut Raster,
    src: &Raster,
    mask: &AlphaMask,
    parallel: bool,
) -> RetouchResult<()> {
    if dst.width != src.width
        || dst.height != src.height
        || dst.width != mask.width
        || dst.height != mask.height
        || dst.data.len() != src.data.len()
    {
        return Err(RetouchError::validation(
            "mask_lerp_in_place expects matching raster and mask sizes",
        ));
    }
    let apply = |((d, s), &m): ((&mut [u8], &[u8]), &f32)| {
        let out = lerp_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], m);
        d.copy_from_slice(&out);
    };
    if parallel {
        dst.data
            .par_chunks_exact_mut(4)
            .zip(src.data.par_chunks_exact(4))
            .zip(mask.data.par_iter())
            .for_each(apply);
    } else {
        dst.data
            .chunks_exact_mut(4)
            .zip(src.data.chunks_exact(4))
            .zip(mask.data.iter())
            .for_each(apply);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
