//! Single-channel alpha surfaces and brush rasterization.
//!
//! Every pixel is sampled at its integer coordinate. Paint dabs composite source-over, erase dabs
//! destination-out, and a dab only touches its own bounding box.

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::math::unit_to_u8;
use crate::mask::stroke::{BrushParams, Stroke};

/// A `width x height` coverage surface with values in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaMask {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major coverage.
    pub data: Vec<f32>,
}

impl AlphaMask {
    /// Fully transparent mask.
    pub fn new(width: u32, height: u32) -> RetouchResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| RetouchError::resource("mask size overflow"))?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; len],
        })
    }

    /// Coverage at `(x, y)`; zero out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// `true` when every pixel is zero.
    pub fn is_clear(&self) -> bool {
        self.data.iter().all(|&a| a == 0.0)
    }

    /// Replace every value `a` with `1 - a`.
    pub fn invert(&mut self) {
        for a in &mut self.data {
            *a = 1.0 - *a;
        }
    }

    /// Inverted copy.
    pub fn inverted(&self) -> Self {
        let mut out = self.clone();
        out.invert();
        out
    }

    /// Quantized to 8-bit gray for export and debugging.
    pub fn to_luma8(&self) -> Vec<u8> {
        self.data.iter().map(|&a| unit_to_u8(a)).collect()
    }
}

/// Coverage of a single dab at distance `d` from its center, before strength.
pub fn dab_falloff(brush: &BrushParams, d: f32) -> f32 {
    let inner = brush.inner_radius();
    if d <= inner {
        1.0
    } else if d >= brush.radius {
        0.0
    } else {
        (brush.radius - d) / (brush.radius - inner)
    }
}

/// Paint one dab centered at `c`.
pub fn paint_dab(mask: &mut AlphaMask, c: Point, brush: &BrushParams) {
    let opacity = brush.strength / 100.0;
    if opacity <= 0.0 || mask.width == 0 || mask.height == 0 {
        return;
    }
    let r = f64::from(brush.radius);
    let max_x = f64::from(mask.width - 1);
    let max_y = f64::from(mask.height - 1);
    if c.x + r < 0.0 || c.y + r < 0.0 || c.x - r > max_x || c.y - r > max_y {
        return;
    }
    let x0 = (c.x - r).floor().clamp(0.0, max_x) as u32;
    let x1 = (c.x + r).ceil().clamp(0.0, max_x) as u32;
    let y0 = (c.y - r).floor().clamp(0.0, max_y) as u32;
    let y1 = (c.y + r).ceil().clamp(0.0, max_y) as u32;

    let w = mask.width as usize;
    for y in y0..=y1 {
        let dy = f64::from(y) - c.y;
        let row = (y as usize) * w;
        for x in x0..=x1 {
            let dx = f64::from(x) - c.x;
            let d = (dx * dx + dy * dy).sqrt() as f32;
            let dab = dab_falloff(brush, d) * opacity;
            if dab <= 0.0 {
                continue;
            }
            let a = &mut mask.data[row + x as usize];
            *a = if brush.erase {
                *a * (1.0 - dab)
            } else {
                *a + dab * (1.0 - *a)
            };
        }
    }
}

/// Paint the segment `a -> b`, resampled at the brush step. The dab at `a` itself is skipped so
/// consecutive segments of one polyline never double-paint their shared point.
///
/// Only the part of the segment within `radius` of the canvas is resampled, so far-off endpoints
/// cost no more than a segment crossing the whole surface.
pub fn paint_segment(mask: &mut AlphaMask, a: Point, b: Point, brush: &BrushParams) {
    let r = f64::from(brush.radius.max(0.0)) + 1.0;
    let bounds = Rect::new(
        -r,
        -r,
        f64::from(mask.width) - 1.0 + r,
        f64::from(mask.height) - 1.0 + r,
    );
    let Some((t0, t1)) = clip_segment(a, b, bounds) else {
        return;
    };
    let p0 = a.lerp(b, t0);
    let p1 = a.lerp(b, t1);
    let step = f64::from(brush.sample_step());
    let n = ((p1 - p0).hypot() / step).ceil().max(1.0) as u32;
    let first = if t0 > 0.0 { 0 } else { 1 };
    for i in first..=n {
        let t = f64::from(i) / f64::from(n);
        paint_dab(mask, p0.lerp(p1, t), brush);
    }
}

/// Liang-Barsky clip of `a -> b` against `bounds`, as a parameter range within `[0, 1]`.
fn clip_segment(a: Point, b: Point, bounds: Rect) -> Option<(f64, f64)> {
    if !(a.is_finite() && b.is_finite()) {
        return None;
    }
    let d = b - a;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-d.x, a.x - bounds.x0),
        (d.x, bounds.x1 - a.x),
        (-d.y, a.y - bounds.y0),
        (d.y, bounds.y1 - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Paint a whole stroke: a dab at the first point, then every segment in order.
pub fn paint_stroke(mask: &mut AlphaMask, stroke: &Stroke) {
    let Some((&first, rest)) = stroke.points.split_first() else {
        return;
    };
    paint_dab(mask, first, &stroke.brush);
    let mut prev = first;
    for &p in rest {
        paint_segment(mask, prev, p, &stroke.brush);
        prev = p;
    }
}

/// Paint `strokes` in order onto a fresh `width x height` mask.
pub fn render_strokes<'a>(
    width: u32,
    height: u32,
    strokes: impl IntoIterator<Item = &'a Stroke>,
) -> RetouchResult<AlphaMask> {
    let mut mask = AlphaMask::new(width, height)?;
    for s in strokes {
        paint_stroke(&mut mask, s);
    }
    Ok(mask)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/builder.rs"]
mod tests;
