//! Freehand "light" strokes: a filter effect confined to the painted area of a stroke.

use serde::{Deserialize, Serialize};

use crate::adjust::filters::{
    FillBlend, FilterFactors, apply_filter_factors, blend_fill, gaussian_blur, unsharp_mask,
};
use crate::composite::blend::mask_lerp_in_place;
use crate::foundation::core::Raster;
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::math::u8_to_unit;
use crate::foundation::opts::EngineOpts;
use crate::mask::builder::{AlphaMask, paint_stroke};
use crate::mask::stroke::Stroke;

const LIGHTEN_GAIN: f32 = 0.5;
const WARM_LIGHT: [f32; 3] = [1.0, 0.8, 0.5];
const COOL_LIGHT: [f32; 3] = [0.5, 0.7, 1.0];
const COOL_SHADE: [f32; 3] = [0.55, 0.6, 0.75];
const MAX_BLUR_SIGMA: f32 = 8.0;

/// Effect painted by a light stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightMode {
    /// Additive white light.
    RaiseWhite,
    /// Additive warm light.
    RaiseWarm,
    /// Additive cool light.
    RaiseCool,
    /// Multiplicative cool shade.
    Darken,
    /// Soft-light toward black.
    LowerHighlights,
    /// Soft-light toward white.
    RaiseShadows,
    /// Contrast boost.
    AddContrast,
    /// Contrast cut.
    ReduceContrast,
    /// Saturation boost.
    AddSaturation,
    /// Saturation cut.
    ReduceSaturation,
    /// Unsharp mask.
    Sharpen,
    /// Gaussian blur.
    Blur,
}

impl LightMode {
    /// Every mode, in menu order.
    pub const ALL: [LightMode; 12] = [
        LightMode::RaiseWhite,
        LightMode::RaiseWarm,
        LightMode::RaiseCool,
        LightMode::Darken,
        LightMode::LowerHighlights,
        LightMode::RaiseShadows,
        LightMode::AddContrast,
        LightMode::ReduceContrast,
        LightMode::AddSaturation,
        LightMode::ReduceSaturation,
        LightMode::Sharpen,
        LightMode::Blur,
    ];

    fn default_color(self) -> Option<[f32; 3]> {
        match self {
            LightMode::RaiseWhite => Some([1.0, 1.0, 1.0]),
            LightMode::RaiseWarm => Some(WARM_LIGHT),
            LightMode::RaiseCool => Some(COOL_LIGHT),
            LightMode::Darken => Some(COOL_SHADE),
            _ => None,
        }
    }
}

/// A committed light stroke.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightStroke {
    /// Paint-only stroke geometry.
    pub stroke: Stroke,
    /// Effect.
    pub mode: LightMode,
    /// Effect strength, `[0, 100]`.
    pub intensity: f32,
    /// Straight RGB override for the fill modes.
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

impl LightStroke {
    /// Reject erase strokes and out-of-domain intensity.
    pub fn validate(&self) -> RetouchResult<()> {
        self.stroke.validate()?;
        if self.stroke.brush.erase {
            return Err(RetouchError::validation("light strokes cannot erase"));
        }
        if !self.intensity.is_finite() || !(0.0..=100.0).contains(&self.intensity) {
            return Err(RetouchError::validation(
                "light.intensity must be within [0, 100]",
            ));
        }
        Ok(())
    }

    /// Fill color for the fill modes, honoring the override.
    pub fn fill_color(&self) -> Option<[f32; 3]> {
        let base = self.mode.default_color()?;
        Some(self.color.map(|c| c.map(u8_to_unit)).unwrap_or(base))
    }
}

/// The full-frame effect of `mode` at `intensity` before masking.
pub fn light_effect(
    src: &Raster,
    mode: LightMode,
    intensity: f32,
    color: Option<[f32; 3]>,
    parallel: bool,
) -> Raster {
    let k = (intensity / 100.0).clamp(0.0, 1.0);
    let mut out = src.clone();
    if k <= 0.0 {
        return out;
    }
    let fill = color.or(mode.default_color()).unwrap_or([1.0, 1.0, 1.0]);
    match mode {
        LightMode::RaiseWhite | LightMode::RaiseWarm | LightMode::RaiseCool => {
            let add = fill.map(|c| c * k * LIGHTEN_GAIN);
            blend_fill(&mut out, add, 1.0, FillBlend::Add, parallel);
        }
        LightMode::Darken => blend_fill(&mut out, fill, k, FillBlend::Multiply, parallel),
        LightMode::LowerHighlights => {
            blend_fill(&mut out, [0.0; 3], k, FillBlend::SoftLight, parallel)
        }
        LightMode::RaiseShadows => {
            blend_fill(&mut out, [1.0; 3], k, FillBlend::SoftLight, parallel)
        }
        LightMode::AddContrast | LightMode::ReduceContrast => {
            let sign = if mode == LightMode::AddContrast { 1.0 } else { -1.0 };
            let f = FilterFactors {
                contrast: 1.0 + sign * 0.5 * k,
                ..FilterFactors::default()
            };
            apply_filter_factors(&mut out, f, parallel);
        }
        LightMode::AddSaturation | LightMode::ReduceSaturation => {
            let sign = if mode == LightMode::AddSaturation { 1.0 } else { -1.0 };
            let f = FilterFactors {
                saturate: 1.0 + sign * k,
                ..FilterFactors::default()
            };
            apply_filter_factors(&mut out, f, parallel);
        }
        LightMode::Sharpen => unsharp_mask(&mut out, 1.5 * k, 1.0, parallel),
        LightMode::Blur => out = gaussian_blur(&out, MAX_BLUR_SIGMA * k, parallel),
    }
    out
}

/// Coverage of one light stroke on a `width x height` surface.
pub fn light_mask(stroke: &LightStroke, width: u32, height: u32) -> RetouchResult<AlphaMask> {
    let mut mask = AlphaMask::new(width, height)?;
    paint_stroke(&mut mask, &stroke.stroke);
    Ok(mask)
}

/// Apply one stroke onto `image` using an already painted `mask`.
pub fn apply_light_stroke(
    image: &mut Raster,
    stroke: &LightStroke,
    mask: &AlphaMask,
    parallel: bool,
) -> RetouchResult<()> {
    if mask.is_clear() {
        return Ok(());
    }
    let effect = light_effect(
        image,
        stroke.mode,
        stroke.intensity,
        stroke.fill_color(),
        parallel,
    );
    mask_lerp_in_place(image, &effect, mask, parallel)
}

/// Apply every stroke in commit order to a copy of `base`.
pub fn light_pass<'a>(
    base: &Raster,
    strokes: impl IntoIterator<Item = &'a LightStroke>,
    opts: &EngineOpts,
) -> RetouchResult<Raster> {
    let painted = strokes
        .into_iter()
        .map(|s| Ok((s, light_mask(s, base.width, base.height)?)))
        .collect::<RetouchResult<Vec<_>>>()?;
    light_pass_with_masks(base, painted.iter().map(|(s, m)| (*s, m)), opts)
}

/// [`light_pass`] with each stroke's coverage already painted.
pub fn light_pass_with_masks<'a>(
    base: &Raster,
    strokes: impl IntoIterator<Item = (&'a LightStroke, &'a AlphaMask)>,
    opts: &EngineOpts,
) -> RetouchResult<Raster> {
    let mut out = base.clone();
    for (s, mask) in strokes {
        if mask.width != base.width || mask.height != base.height {
            return Err(RetouchError::validation(
                "light mask size does not match the image",
            ));
        }
        apply_light_stroke(&mut out, s, mask, opts.parallel)?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/light.rs"]
mod tests;
