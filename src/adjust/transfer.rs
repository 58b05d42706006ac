//! The adjustment transfer function: one `Adjustments` record applied to a full-color raster.
//!
//! Stage order is fixed: meta-slider fold, filter pass (brightness/contrast/saturate, blur,
//! optional unsharp), vibrance/mixer, temperature/tint casts, highlight/shadow fills, vignette.

use crate::adjust::color::apply_hsl_pass;
use crate::adjust::filters::{
    FillBlend, FilterFactors, apply_filter_factors, blend_fill, gaussian_blur, unsharp_mask,
    vignette,
};
use crate::adjust::model::{Adjustments, Domain};
use crate::foundation::core::Raster;
use crate::foundation::opts::EngineOpts;

/// Effective clarity above which an unsharp-mask pass runs after the filter pass.
pub const CLARITY_SHARPEN_THRESHOLD: f32 = 2.0;
const CLARITY_SHARPEN_GAIN: f32 = 0.6;
const CLARITY_SHARPEN_SIGMA: f32 = 1.0;

const WARM: [f32; 3] = [1.0, 0.65, 0.0];
const COOL: [f32; 3] = [0.0, 0.4, 1.0];
const MAGENTA: [f32; 3] = [1.0, 0.0, 1.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const BLACK: [f32; 3] = [0.0, 0.0, 0.0];

/// Fold `accent` and `enhance` into the sliders they drive, clamping each to its domain.
///
/// The returned record has both meta-sliders zeroed.
pub fn effective(adj: &Adjustments) -> Adjustments {
    let mut out = *adj;
    let accent = adj.accent;
    let enhance = adj.enhance;
    out.accent = 0.0;
    out.enhance = 0.0;
    if accent == 0.0 && enhance == 0.0 {
        return out;
    }

    let signed = Domain::SIGNED;
    out.shadows = signed.clamp(adj.shadows + accent * 0.5 + enhance * 0.2);
    out.highlights = signed.clamp(adj.highlights - accent * 0.5 - enhance * 0.1);
    out.contrast = signed.clamp(adj.contrast + enhance * 0.25);
    out.saturation = signed.clamp(adj.saturation + enhance * 0.2);
    out.clarity = Domain::CLARITY.clamp(adj.clarity + enhance * 0.03 + accent * 0.02);
    out
}

/// Filter factors for the first pass of an already-folded record.
pub fn filter_factors(adj: &Adjustments) -> FilterFactors {
    FilterFactors {
        brightness: (1.0 + (adj.brightness + adj.exposure - adj.dehaze) / 100.0).max(0.0),
        contrast: (1.0 + (adj.contrast + 2.5 * adj.clarity) / 100.0).max(0.0),
        saturate: (1.0 + adj.saturation / 100.0).max(0.0),
    }
}

/// Apply `adj` to `src`, returning a new raster of the same size.
///
/// Inputs are expected to be validated. Neutral adjustments return an identical copy.
pub fn apply_adjustments(src: &Raster, adj: &Adjustments, opts: &EngineOpts) -> Raster {
    if adj.is_neutral() {
        return src.clone();
    }
    let par = opts.parallel;
    let a = effective(adj);

    let mut out = src.clone();
    apply_filter_factors(&mut out, filter_factors(&a), par);
    if a.blur > 0.0 {
        out = gaussian_blur(&out, a.blur, par);
    }
    if a.clarity > CLARITY_SHARPEN_THRESHOLD {
        let amount = a.clarity / 10.0 * CLARITY_SHARPEN_GAIN;
        unsharp_mask(&mut out, amount, CLARITY_SHARPEN_SIGMA, par);
    }

    apply_hsl_pass(&mut out, a.vibrance, &a.color_mixer, par);

    if a.temperature != 0.0 {
        let cast = if a.temperature > 0.0 { WARM } else { COOL };
        blend_fill(&mut out, cast, a.temperature.abs() / 250.0, FillBlend::Overlay, par);
    }
    if a.tint != 0.0 {
        let cast = if a.tint > 0.0 { MAGENTA } else { GREEN };
        blend_fill(&mut out, cast, a.tint.abs() / 250.0, FillBlend::Overlay, par);
    }

    if a.highlights != 0.0 {
        let fill = if a.highlights > 0.0 { WHITE } else { BLACK };
        blend_fill(&mut out, fill, a.highlights.abs() / 100.0, FillBlend::SoftLight, par);
    }
    if a.shadows != 0.0 {
        let fill = if a.shadows > 0.0 { WHITE } else { BLACK };
        let alpha = (a.shadows.abs() / 100.0).powf(1.5);
        blend_fill(&mut out, fill, alpha, FillBlend::SoftLight, par);
    }

    vignette(&mut out, a.vignette, par);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/adjust/transfer.rs"]
mod tests;
