//! Per-pixel iteration helpers shared by the adjustment and compositing stages.

use rayon::prelude::*;

use crate::foundation::core::Raster;
use crate::foundation::math::{premul_rgba8, u8_to_unit, unit_to_u8, unpremul_rgba8};

/// Run `f` over every non-transparent pixel as straight RGB in `[0, 1]`, keeping alpha.
///
/// `f` receives the pixel index so position-dependent stages (vignette) can use it.
pub(crate) fn map_rgb<F>(raster: &mut Raster, parallel: bool, f: F)
where
    F: Fn(usize, [f32; 3]) -> [f32; 3] + Sync,
{
    let f = &f;
    let apply = move |(i, px): (usize, &mut [u8])| {
        let a = px[3];
        if a == 0 {
            return;
        }
        let s = unpremul_rgba8([px[0], px[1], px[2], a]);
        let out = f(i, [u8_to_unit(s[0]), u8_to_unit(s[1]), u8_to_unit(s[2])]);
        let p = premul_rgba8([
            unit_to_u8(out[0]),
            unit_to_u8(out[1]),
            unit_to_u8(out[2]),
            a,
        ]);
        px.copy_from_slice(&p);
    };
    if parallel {
        raster
            .data
            .par_chunks_exact_mut(4)
            .enumerate()
            .for_each(apply);
    } else {
        raster.data.chunks_exact_mut(4).enumerate().for_each(apply);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/pixels.rs"]
mod tests;
