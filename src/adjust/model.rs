use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{RetouchError, RetouchResult};

/// One of the eight fixed hue bands of the color mixer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueBand {
    /// Reds.
    Red,
    /// Oranges.
    Orange,
    /// Yellows.
    Yellow,
    /// Greens.
    Green,
    /// Aquas / cyans.
    Aqua,
    /// Blues.
    Blue,
    /// Purples.
    Purple,
    /// Magentas.
    Magenta,
}

impl HueBand {
    /// All bands in mixer order.
    pub const ALL: [HueBand; 8] = [
        HueBand::Red,
        HueBand::Orange,
        HueBand::Yellow,
        HueBand::Green,
        HueBand::Aqua,
        HueBand::Blue,
        HueBand::Purple,
        HueBand::Magenta,
    ];

    /// Band center hue in degrees.
    pub fn center_deg(self) -> f32 {
        match self {
            HueBand::Red => 0.0,
            HueBand::Orange => 30.0,
            HueBand::Yellow => 60.0,
            HueBand::Green => 120.0,
            HueBand::Aqua => 180.0,
            HueBand::Blue => 240.0,
            HueBand::Purple => 280.0,
            HueBand::Magenta => 320.0,
        }
    }

    /// Full angular width of the band in degrees; influence reaches zero at half of it.
    pub fn range_deg(self) -> f32 {
        match self {
            HueBand::Red => 60.0,
            HueBand::Orange => 40.0,
            HueBand::Yellow => 50.0,
            HueBand::Green => 80.0,
            HueBand::Aqua => 60.0,
            HueBand::Blue => 70.0,
            HueBand::Purple => 50.0,
            HueBand::Magenta => 50.0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-band shift in slider units, each in `[-100, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerShift {
    /// Hue shift (±100 maps to ±30°).
    pub hue: f32,
    /// Saturation shift (±100 maps to ±1.0).
    pub saturation: f32,
    /// Lightness shift (±100 maps to ±0.5).
    pub lightness: f32,
}

impl MixerShift {
    /// `true` when all three shifts are zero.
    pub fn is_zero(&self) -> bool {
        self.hue == 0.0 && self.saturation == 0.0 && self.lightness == 0.0
    }
}

/// Hue-banded HSL mixer.
///
/// Serializes as a map from band name to shift; absent bands are zero and zero bands are omitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<HueBand, MixerShift>",
    into = "BTreeMap<HueBand, MixerShift>"
)]
pub struct ColorMixer {
    bands: [MixerShift; 8],
}

impl From<BTreeMap<HueBand, MixerShift>> for ColorMixer {
    fn from(map: BTreeMap<HueBand, MixerShift>) -> Self {
        let mut mixer = Self::default();
        for (band, shift) in map {
            mixer.set(band, shift);
        }
        mixer
    }
}

impl From<ColorMixer> for BTreeMap<HueBand, MixerShift> {
    fn from(mixer: ColorMixer) -> Self {
        mixer.iter().filter(|(_, s)| !s.is_zero()).collect()
    }
}

impl ColorMixer {
    /// Shift for a band.
    pub fn get(&self, band: HueBand) -> MixerShift {
        self.bands[band.index()]
    }

    /// Replace the shift for a band.
    pub fn set(&mut self, band: HueBand, shift: MixerShift) {
        self.bands[band.index()] = shift;
    }

    /// Builder form of [`ColorMixer::set`].
    pub fn with(mut self, band: HueBand, shift: MixerShift) -> Self {
        self.set(band, shift);
        self
    }

    /// `true` when every band is zero.
    pub fn is_neutral(&self) -> bool {
        self.bands.iter().all(MixerShift::is_zero)
    }

    /// Iterate `(band, shift)` pairs in mixer order.
    pub fn iter(&self) -> impl Iterator<Item = (HueBand, MixerShift)> + '_ {
        HueBand::ALL.iter().map(|&b| (b, self.get(b)))
    }
}

/// Scalar adjustment set. Every field defaults to its neutral value (zero).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// `[-100, 100]`
    pub brightness: f32,
    /// `[-100, 100]`
    pub exposure: f32,
    /// `[-100, 100]`
    pub contrast: f32,
    /// `[-100, 100]`
    pub highlights: f32,
    /// `[-100, 100]`
    pub shadows: f32,
    /// `[0, 100]`
    pub vignette: f32,
    /// `[-100, 100]`
    pub saturation: f32,
    /// `[-10, 10]`
    pub vibrance: f32,
    /// `[-100, 100]`
    pub temperature: f32,
    /// `[-100, 100]`
    pub tint: f32,
    /// `[0, 10]`
    pub clarity: f32,
    /// `[0, 100]`
    pub dehaze: f32,
    /// Gaussian sigma in pixels, `[0, 20]`.
    pub blur: f32,
    /// Shadow lift + highlight recovery meta-slider, `[0, 100]`.
    pub accent: f32,
    /// Broad automatic boost meta-slider, `[0, 100]`.
    pub enhance: f32,
    /// Hue-banded mixer.
    pub color_mixer: ColorMixer,
}

/// Domain of a scalar field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Domain {
    pub(crate) min: f32,
    pub(crate) max: f32,
}

impl Domain {
    pub(crate) const SIGNED: Domain = Domain {
        min: -100.0,
        max: 100.0,
    };
    const PERCENT: Domain = Domain {
        min: 0.0,
        max: 100.0,
    };
    pub(crate) const VIBRANCE: Domain = Domain {
        min: -10.0,
        max: 10.0,
    };
    pub(crate) const CLARITY: Domain = Domain {
        min: 0.0,
        max: 10.0,
    };
    const BLUR: Domain = Domain {
        min: 0.0,
        max: 20.0,
    };

    pub(crate) fn clamp(self, v: f32) -> f32 {
        v.clamp(self.min, self.max)
    }

    fn check(self, name: &str, v: f32) -> RetouchResult<()> {
        if !v.is_finite() || v < self.min || v > self.max {
            return Err(RetouchError::validation(format!(
                "adjustments.{name} must be within [{}, {}], got {v}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

macro_rules! scalar_fields {
    ($m:ident) => {
        $m!(brightness, Domain::SIGNED);
        $m!(exposure, Domain::SIGNED);
        $m!(contrast, Domain::SIGNED);
        $m!(highlights, Domain::SIGNED);
        $m!(shadows, Domain::SIGNED);
        $m!(vignette, Domain::PERCENT);
        $m!(saturation, Domain::SIGNED);
        $m!(vibrance, Domain::VIBRANCE);
        $m!(temperature, Domain::SIGNED);
        $m!(tint, Domain::SIGNED);
        $m!(clarity, Domain::CLARITY);
        $m!(dehaze, Domain::PERCENT);
        $m!(blur, Domain::BLUR);
        $m!(accent, Domain::PERCENT);
        $m!(enhance, Domain::PERCENT);
    };
}

impl Adjustments {
    /// The all-neutral record.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// `true` when every field equals its neutral value.
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Fail on the first field that is non-finite or outside its domain.
    pub fn validate(&self) -> RetouchResult<()> {
        macro_rules! check {
            ($f:ident, $d:expr) => {
                $d.check(stringify!($f), self.$f)?;
            };
        }
        scalar_fields!(check);

        for (band, shift) in self.color_mixer.iter() {
            for (what, v) in [
                ("hue", shift.hue),
                ("saturation", shift.saturation),
                ("lightness", shift.lightness),
            ] {
                if !v.is_finite() || !(-100.0..=100.0).contains(&v) {
                    return Err(RetouchError::validation(format!(
                        "color_mixer.{band:?}.{what} must be within [-100, 100], got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Layer values added on top of `self`, each clamped to its domain.
    pub fn merged(&self, layer: &Adjustments) -> Adjustments {
        let mut out = *self;
        macro_rules! add {
            ($f:ident, $d:expr) => {
                out.$f = $d.clamp(self.$f + layer.$f);
            };
        }
        scalar_fields!(add);

        for band in HueBand::ALL {
            let a = self.color_mixer.get(band);
            let b = layer.color_mixer.get(band);
            out.color_mixer.set(
                band,
                MixerShift {
                    hue: (a.hue + b.hue).clamp(-100.0, 100.0),
                    saturation: (a.saturation + b.saturation).clamp(-100.0, 100.0),
                    lightness: (a.lightness + b.lightness).clamp(-100.0, 100.0),
                },
            );
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/adjust/model.rs"]
mod tests;
