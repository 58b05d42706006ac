use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Vec2, percent_to_px};
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::mask::builder::AlphaMask;

/// Gradient geometry in percentage-of-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientDescriptor {
    /// Full-coverage anchor (linear) or ellipse center (radial), `%`.
    pub start: Point,
    /// Zero-coverage anchor (linear) or a point on the ellipse rim (radial), `%`.
    pub end: Point,
    /// Vertical/horizontal radius ratio of a radial ellipse. `None` is a circle.
    #[serde(default)]
    pub ratio: Option<f64>,
    /// Radial ellipse rotation in degrees.
    #[serde(default)]
    pub rotation: Option<f64>,
    /// Radial soft edge, `[0, 100]`.
    #[serde(default)]
    pub feather: f64,
}

impl GradientDescriptor {
    /// Reject non-finite coordinates, a non-positive ratio, or feather outside `[0, 100]`.
    pub fn validate(&self) -> RetouchResult<()> {
        let coords = [self.start.x, self.start.y, self.end.x, self.end.y];
        if coords.iter().any(|v| !v.is_finite()) {
            return Err(RetouchError::validation(
                "gradient start/end must be finite",
            ));
        }
        if let Some(r) = self.ratio
            && (!r.is_finite() || r <= 0.0)
        {
            return Err(RetouchError::validation("gradient.ratio must be > 0"));
        }
        if let Some(r) = self.rotation
            && !r.is_finite()
        {
            return Err(RetouchError::validation("gradient.rotation must be finite"));
        }
        if !self.feather.is_finite() || !(0.0..=100.0).contains(&self.feather) {
            return Err(RetouchError::validation(
                "gradient.feather must be within [0, 100]",
            ));
        }
        Ok(())
    }
}

/// Rasterize a linear gradient: 1 at `start`, 0 at `end`, constant perpendicular to the axis.
pub fn render_linear(
    desc: &GradientDescriptor,
    width: u32,
    height: u32,
) -> RetouchResult<AlphaMask> {
    let mut mask = AlphaMask::new(width, height)?;
    let s = percent_to_px(desc.start, width, height);
    let e = percent_to_px(desc.end, width, height);
    let axis = e - s;
    let len2 = axis.hypot2();
    if len2 <= 0.0 {
        return Ok(mask);
    }
    let w = width as usize;
    for y in 0..height {
        for x in 0..width {
            let p = Point::new(f64::from(x), f64::from(y));
            let t = (p - s).dot(axis) / len2;
            mask.data[(y as usize) * w + x as usize] = (1.0 - t).clamp(0.0, 1.0) as f32;
        }
    }
    Ok(mask)
}

/// Rasterize a radial gradient: an ellipse around `start` whose horizontal radius is the pixel
/// distance to `end`.
pub fn render_radial(
    desc: &GradientDescriptor,
    width: u32,
    height: u32,
) -> RetouchResult<AlphaMask> {
    let mut mask = AlphaMask::new(width, height)?;
    let c = percent_to_px(desc.start, width, height);
    let e = percent_to_px(desc.end, width, height);
    let radius = (e - c).hypot();
    if radius <= 0.0 {
        return Ok(mask);
    }
    let ratio = desc.ratio.unwrap_or(1.0);
    let (sin, cos) = desc.rotation.unwrap_or(0.0).to_radians().sin_cos();
    let inner = 1.0 - desc.feather / 100.0;

    let w = width as usize;
    for y in 0..height {
        for x in 0..width {
            let d: Vec2 = Point::new(f64::from(x), f64::from(y)) - c;
            let lx = d.x * cos + d.y * sin;
            let ly = (-d.x * sin + d.y * cos) / ratio;
            let r = (lx * lx + ly * ly).sqrt() / radius;
            let a = if r <= inner {
                1.0
            } else if r >= 1.0 {
                0.0
            } else {
                (1.0 - r) / (1.0 - inner)
            };
            mask.data[(y as usize) * w + x as usize] = a as f32;
        }
    }
    Ok(mask)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/gradient.rs"]
mod tests;
