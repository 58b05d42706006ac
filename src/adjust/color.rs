//! HSL-space pixel remapping: vibrance with skin-tone protection and the hue-banded color mixer.
//!
//! Everything here is a pure per-pixel map with no cross-pixel dependency.

use crate::adjust::model::{ColorMixer, HueBand};
use crate::foundation::core::Raster;
use crate::foundation::pixels::map_rgb;

/// Pixels below this saturation are left alone by vibrance.
pub const VIBRANCE_MIN_SATURATION: f32 = 0.05;
/// Center of the protected skin-tone hue band, degrees.
pub const SKIN_HUE_CENTER_DEG: f32 = 30.0;
/// Half-width of the protected skin-tone band, degrees.
pub const SKIN_HUE_HALF_WIDTH_DEG: f32 = 15.0;
/// Boost strength that survives at the exact skin-tone center.
pub const SKIN_MIN_STRENGTH: f32 = 0.3;

const MIXER_HUE_DEG_PER_UNIT: f32 = 0.3;
const MIXER_SAT_PER_UNIT: f32 = 0.01;
const MIXER_LIGHT_PER_UNIT: f32 = 0.005;

/// A color in HSL: hue in `[0, 360)`, saturation and lightness in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    /// Hue in degrees.
    pub h: f32,
    /// Saturation.
    pub s: f32,
    /// Lightness.
    pub l: f32,
}

/// Convert straight RGB in `[0, 1]` to HSL.
pub fn rgb_to_hsl(rgb: [f32; 3]) -> Hsl {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d <= f32::EPSILON {
        return Hsl { h: 0.0, s: 0.0, l };
    }
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    Hsl {
        h: wrap_hue(h * 60.0),
        s,
        l,
    }
}

/// Convert HSL back to straight RGB in `[0, 1]`.
pub fn hsl_to_rgb(c: Hsl) -> [f32; 3] {
    if c.s <= 0.0 {
        return [c.l, c.l, c.l];
    }
    let q = if c.l < 0.5 {
        c.l * (1.0 + c.s)
    } else {
        c.l + c.s - c.l * c.s
    };
    let p = 2.0 * c.l - q;
    let h = c.h / 360.0;
    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Wrap any angle into `[0, 360)`.
pub fn wrap_hue(h: f32) -> f32 {
    let w = h.rem_euclid(360.0);
    if w >= 360.0 { 0.0 } else { w }
}

/// Shortest angular distance between two hues, in `[0, 180]`.
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 { 360.0 - d } else { d }
}

/// Saturation after applying `vibrance` to a pixel of hue `h` and saturation `s`.
pub fn vibrance_saturation(h: f32, s: f32, vibrance: f32) -> f32 {
    if vibrance == 0.0 || s < VIBRANCE_MIN_SATURATION {
        return s;
    }
    let boost = (vibrance / 50.0) * (1.0 - s * s);
    let d = hue_distance(h, SKIN_HUE_CENTER_DEG);
    let protection = if d < SKIN_HUE_HALF_WIDTH_DEG {
        SKIN_MIN_STRENGTH + (1.0 - SKIN_MIN_STRENGTH) * (d / SKIN_HUE_HALF_WIDTH_DEG)
    } else {
        1.0
    };
    (s * (1.0 + boost * protection)).clamp(0.0, 1.0)
}

/// Influence of `band` on a pixel of hue `h`, in `[0, 1]`.
pub fn band_influence(band: HueBand, h: f32) -> f32 {
    let d = hue_distance(h, band.center_deg());
    (1.0 - d / (band.range_deg() / 2.0)).max(0.0)
}

/// Apply the color mixer to one HSL color. Achromatic pixels carry no hue and are returned as-is.
pub fn mix_hsl(c: Hsl, mixer: &ColorMixer) -> Hsl {
    if c.s <= 0.0 {
        return c;
    }
    let mut dh = 0.0;
    let mut ds = 0.0;
    let mut dl = 0.0;
    for (band, shift) in mixer.iter() {
        if shift.is_zero() {
            continue;
        }
        let w = band_influence(band, c.h);
        if w <= 0.0 {
            continue;
        }
        dh += w * shift.hue * MIXER_HUE_DEG_PER_UNIT;
        ds += w * shift.saturation * MIXER_SAT_PER_UNIT;
        dl += w * shift.lightness * MIXER_LIGHT_PER_UNIT;
    }
    Hsl {
        h: wrap_hue(c.h + dh),
        s: (c.s + ds).clamp(0.0, 1.0),
        l: (c.l + dl).clamp(0.0, 1.0),
    }
}

/// Vibrance then mixer on a single straight RGB pixel.
pub fn process_pixel(rgb: [f32; 3], vibrance: f32, mixer: &ColorMixer) -> [f32; 3] {
    let mut c = rgb_to_hsl(rgb);
    c.s = vibrance_saturation(c.h, c.s, vibrance);
    let c = mix_hsl(c, mixer);
    hsl_to_rgb(c)
}

/// Run the vibrance/mixer processor over a raster in place. No-op when both are neutral.
pub fn apply_hsl_pass(raster: &mut Raster, vibrance: f32, mixer: &ColorMixer, parallel: bool) {
    if vibrance == 0.0 && mixer.is_neutral() {
        return;
    }
    map_rgb(raster, parallel, |_, rgb| process_pixel(rgb, vibrance, mixer));
}

#[cfg(test)]
#[path = "../../tests/unit/adjust/color.rs"]
mod tests;
