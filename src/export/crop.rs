use serde::{Deserialize, Serialize};

use crate::foundation::core::Raster;
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::opts::EngineOpts;

/// A crop rectangle in source pixels, optionally rotated about its own center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge of the unrotated rectangle.
    pub x: f64,
    /// Top edge of the unrotated rectangle.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Clockwise rotation in degrees about the rectangle center.
    #[serde(default)]
    pub rotation: f64,
}

impl CropRect {
    /// Output size in whole pixels.
    pub fn output_size(&self) -> (u32, u32) {
        (
            self.width.round().max(0.0) as u32,
            self.height.round().max(0.0) as u32,
        )
    }

    /// Reject non-finite fields and rectangles smaller than one pixel.
    pub fn validate(&self) -> RetouchResult<()> {
        let fields = [self.x, self.y, self.width, self.height, self.rotation];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(RetouchError::validation("crop fields must be finite"));
        }
        let (w, h) = self.output_size();
        if w == 0 || h == 0 {
            return Err(RetouchError::validation(
                "crop must be at least one pixel in each dimension",
            ));
        }
        Ok(())
    }
}

/// Premultiplied bilinear sample at continuous pixel coordinates; outside the raster is
/// transparent.
fn sample_bilinear(src: &Raster, x: f64, y: f64) -> [u8; 4] {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;

    let fetch = |ix: f64, iy: f64| -> [f32; 4] {
        if ix < 0.0 || iy < 0.0 || ix >= f64::from(src.width) || iy >= f64::from(src.height) {
            return [0.0; 4];
        }
        src.pixel(ix as u32, iy as u32).map(f32::from)
    };
    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - tx) + p10[c] * tx;
        let bottom = p01[c] * (1.0 - tx) + p11[c] * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Resample the rotated rectangle into a new raster of the crop's pixel size.
#[tracing::instrument(skip(src, opts), fields(w = src.width, h = src.height))]
pub fn crop(src: &Raster, rect: &CropRect, opts: &EngineOpts) -> RetouchResult<Raster> {
    rect.validate()?;
    let (ow, oh) = rect.output_size();
    opts.check_dimensions(ow, oh)?;
    let mut out = Raster::new(ow, oh)?;

    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    let (sin, cos) = rect.rotation.to_radians().sin_cos();
    let half_w = f64::from(ow) / 2.0;
    let half_h = f64::from(oh) / 2.0;
    for j in 0..oh {
        for i in 0..ow {
            let lx = f64::from(i) + 0.5 - half_w;
            let ly = f64::from(j) + 0.5 - half_h;
            let sx = cx + lx * cos - ly * sin;
            let sy = cy + lx * sin + ly * cos;
            let px = sample_bilinear(src, sx, sy);
            let o = ((j as usize) * (ow as usize) + i as usize) * 4;
            out.data[o..o + 4].copy_from_slice(&px);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/crop.rs"]
mod tests;
