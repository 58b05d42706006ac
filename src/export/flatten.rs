//! Flatten the live composite, export transforms and overlays into one raster.
//!
//! Right-angle rotations and flips remap pixels exactly. Any other angle is drawn with
//! `vello_cpu` into the rotated bounding box. Overlays are rendered into their own transparent
//! layer and composited source-over, so pixels they do not cover keep the composite's values.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::composite::blend::over_in_place;
use crate::foundation::core::{Affine, Raster, Vec2};
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::overlay::model::{Overlay, OverlayContent};
use crate::overlay::text::{FontRegistry, TextLayoutEngine};

/// Export-time geometric transforms. Live rendering ignores them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transforms {
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Mirror horizontally.
    pub flip_x: bool,
    /// Mirror vertically.
    pub flip_y: bool,
}

impl Transforms {
    /// `true` when export reproduces the composite pixel for pixel.
    pub fn is_identity(&self) -> bool {
        quarter_turns(self.rotation) == Some(0) && !self.flip_x && !self.flip_y
    }
}

/// Export options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Skip overlays; used for the flattened base sent to remote editing.
    pub mask_pass: bool,
}

/// Number of clockwise quarter turns when `deg` is a multiple of 90.
fn quarter_turns(deg: f64) -> Option<u32> {
    let q = deg / 90.0;
    let r = q.round();
    if (q - r).abs() < 1e-9 {
        Some(r.rem_euclid(4.0) as u32)
    } else {
        None
    }
}

/// Size of the axis-aligned box holding a `width x height` raster rotated by `rotation` degrees.
pub fn export_size(width: u32, height: u32, rotation: f64) -> (u32, u32) {
    match quarter_turns(rotation) {
        Some(0 | 2) => (width, height),
        Some(_) => (height, width),
        None => {
            let (sin, cos) = rotation.to_radians().sin_cos();
            let w = f64::from(width);
            let h = f64::from(height);
            let bw = (w * cos).abs() + (h * sin).abs();
            let bh = (w * sin).abs() + (h * cos).abs();
            (bw.round().max(1.0) as u32, bh.round().max(1.0) as u32)
        }
    }
}

/// Maps source pixel space into the export box: center, flip, rotate, re-center.
pub fn base_transform(width: u32, height: u32, t: &Transforms) -> Affine {
    let (ow, oh) = export_size(width, height, t.rotation);
    let sx = if t.flip_x { -1.0 } else { 1.0 };
    let sy = if t.flip_y { -1.0 } else { 1.0 };
    Affine::translate(Vec2::new(f64::from(ow) / 2.0, f64::from(oh) / 2.0))
        * Affine::rotate(t.rotation.to_radians())
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate(Vec2::new(
            -f64::from(width) / 2.0,
            -f64::from(height) / 2.0,
        ))
}

fn remap_right_angle(src: &Raster, turns: u32, flip_x: bool, flip_y: bool) -> Raster {
    let (w, h) = (src.width, src.height);
    let (ow, oh) = if turns % 2 == 0 { (w, h) } else { (h, w) };
    let mut data = vec![0u8; src.data.len()];
    for y in 0..h {
        for x in 0..w {
            let fx = if flip_x { w - 1 - x } else { x };
            let fy = if flip_y { h - 1 - y } else { y };
            let (ox, oy) = match turns {
                0 => (fx, fy),
                1 => (h - 1 - fy, fx),
                2 => (w - 1 - fx, h - 1 - fy),
                _ => (fy, w - 1 - fx),
            };
            let si = ((y as usize) * (w as usize) + x as usize) * 4;
            let oi = ((oy as usize) * (ow as usize) + ox as usize) * 4;
            data[oi..oi + 4].copy_from_slice(&src.data[si..si + 4]);
        }
    }
    Raster {
        width: ow,
        height: oh,
        data,
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn dims_u16(width: u32, height: u32) -> RetouchResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RetouchError::export("export width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RetouchError::export("export height exceeds u16"))?;
    Ok((w, h))
}

fn pixmap_from_raster(r: &Raster) -> RetouchResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(r.width, r.height)?;
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(r.pixel_count());
    for px in r.data.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn image_paint(r: &Raster) -> RetouchResult<vello_cpu::Image> {
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap_from_raster(r)?)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_to_raster(pixmap: &vello_cpu::Pixmap) -> Raster {
    Raster {
        width: u32::from(pixmap.width()),
        height: u32::from(pixmap.height()),
        data: pixmap.data_as_u8_slice().to_vec(),
    }
}

fn draw_rotated(src: &Raster, t: &Transforms) -> RetouchResult<Raster> {
    let (ow, oh) = export_size(src.width, src.height, t.rotation);
    let (w, h) = dims_u16(ow, oh)?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(base_transform(src.width, src.height, t)));
    ctx.set_paint(image_paint(src)?);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(src.width),
        f64::from(src.height),
    ));
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap_to_raster(&pixmap))
}

/// Apply export transforms to the composite.
pub fn transform_composite(src: &Raster, t: &Transforms) -> RetouchResult<Raster> {
    match quarter_turns(t.rotation) {
        Some(turns) => Ok(remap_right_angle(src, turns, t.flip_x, t.flip_y)),
        None => draw_rotated(src, t),
    }
}

/// Transform placing an overlay's local box (`box_w x box_h`, origin top-left) on the canvas.
fn overlay_box_transform(o: &Overlay, width: u32, height: u32) -> (Affine, f64, f64) {
    let t = &o.transform;
    let cw = f64::from(width);
    let ch = f64::from(height);
    let bw = t.width / 100.0 * cw;
    let bh = t.height / 100.0 * ch;
    let tr = Affine::translate(Vec2::new(t.x / 100.0 * cw, t.y / 100.0 * ch))
        * Affine::rotate(t.rotation.to_radians())
        * Affine::translate(Vec2::new(-bw / 2.0, -bh / 2.0));
    (tr, bw, bh)
}

fn draw_overlay(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextLayoutEngine,
    o: &Overlay,
    width: u32,
    height: u32,
) -> RetouchResult<()> {
    let (tr, bw, bh) = overlay_box_transform(o, width, height);
    let opacity = (o.transform.opacity / 100.0).clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return Ok(());
    }
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match &o.content {
        OverlayContent::Image(img) => {
            let src = img.source.as_ref();
            let iw = f64::from(src.width);
            let ih = f64::from(src.height);
            let scale = Affine::scale_non_uniform(bw / iw, bh / ih);
            ctx.set_transform(affine_to_cpu(tr * scale));
            ctx.set_paint(image_paint(src)?);
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }
        OverlayContent::Text(text) => {
            let block = engine.layout_block(text, bw as f32, bh as f32, height)?;
            ctx.set_transform(affine_to_cpu(tr));
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            for line in &block.lines {
                for l in line.layout.lines() {
                    for item in l.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));
                        let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x + line.x,
                            y: g.y + line.y,
                        });
                        ctx.glyph_run(&block.font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }
    }
    Ok(())
}

/// Render overlays in ascending z-index into a transparent `width x height` layer.
pub fn render_overlays(
    overlays: &[&Overlay],
    fonts: &FontRegistry,
    width: u32,
    height: u32,
) -> RetouchResult<Raster> {
    let (w, h) = dims_u16(width, height)?;
    let mut engine = TextLayoutEngine::from_registry(fonts)?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    let mut ordered: Vec<&Overlay> = overlays.to_vec();
    ordered.sort_by_key(|o| o.z_index);
    for o in ordered {
        draw_overlay(&mut ctx, &mut engine, o, width, height)?;
    }
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap_to_raster(&pixmap))
}

/// Produce the export raster from a finished composite.
#[tracing::instrument(skip_all, fields(w = composite.width, h = composite.height, overlays = overlays.len()))]
pub fn flatten(
    composite: &Raster,
    overlays: &[&Overlay],
    transforms: &Transforms,
    fonts: &FontRegistry,
    opts: ExportOptions,
) -> RetouchResult<Raster> {
    composite.validate()?;
    let mut out = transform_composite(composite, transforms)?;
    if opts.mask_pass || overlays.is_empty() {
        return Ok(out);
    }
    let layer = render_overlays(overlays, fonts, out.width, out.height)?;
    over_in_place(&mut out, &layer)?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/flatten.rs"]
mod tests;
