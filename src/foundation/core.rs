use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::math::{premul_rgba8, unpremul_rgba8};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// A raster surface in tightly packed, row-major **premultiplied** RGBA8.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl Raster {
    /// Allocate a fully transparent raster.
    pub fn new(width: u32, height: u32) -> RetouchResult<Self> {
        let len = rgba8_byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Allocate a raster filled with a straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RetouchResult<Self> {
        let len = rgba8_byte_len(width, height)?;
        let px = premul_rgba8(rgba);
        let mut data = Vec::with_capacity(len);
        for _ in 0..(len / 4) {
            data.extend_from_slice(&px);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap bytes that are already premultiplied.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> RetouchResult<Self> {
        let out = Self {
            width,
            height,
            data,
        };
        out.validate()?;
        Ok(out)
    }

    /// Wrap straight-alpha RGBA8 bytes, premultiplying them in place.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> RetouchResult<Self> {
        if data.len() != rgba8_byte_len(width, height)? {
            return Err(RetouchError::validation(
                "raster bytes must match width*height*4",
            ));
        }
        for px in data.chunks_exact_mut(4) {
            let out = premul_rgba8([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Check the byte length against the dimensions.
    pub fn validate(&self) -> RetouchResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RetouchError::validation("raster dimensions must be > 0"));
        }
        if self.data.len() != rgba8_byte_len(self.width, self.height)? {
            return Err(RetouchError::validation(
                "raster bytes must match width*height*4",
            ));
        }
        Ok(())
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Premultiplied pixel at `(x, y)`. Out-of-bounds reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Copy out as straight-alpha RGBA8 (for encoders).
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let s = unpremul_rgba8([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&s);
        }
        out
    }
}

/// Byte length of a `width x height` RGBA8 buffer, with overflow reported as a resource error.
pub(crate) fn rgba8_byte_len(width: u32, height: u32) -> RetouchResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| RetouchError::resource("raster buffer size overflow"))
}

/// Convert a percentage-of-canvas point into pixel space.
pub fn percent_to_px(p: Point, width: u32, height: u32) -> Point {
    Point::new(
        p.x / 100.0 * f64::from(width),
        p.y / 100.0 * f64::from(height),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
