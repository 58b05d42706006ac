//! Pointer gesture state machine for moving, resizing and rotating overlays.
//!
//! Pointer positions are in percentage-of-canvas units. Geometry that needs true angles (resize
//! frame rotation, rotate) runs in pixel space using the canvas size.

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::overlay::model::{
    MIN_OVERLAY_SIZE_PCT, Overlay, OverlayId, OverlayTransform, normalize_degrees,
};

/// Gesture kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    /// Translate the center.
    Move,
    /// Change width/height about a fixed center.
    Resize,
    /// Spin about the center.
    Rotate,
}

#[derive(Clone, Copy, Debug)]
struct ActiveGesture {
    kind: GestureKind,
    overlay: OverlayId,
    pointer: Point,
    initial: OverlayTransform,
    start_angle_deg: f64,
}

/// `idle -> {move | resize | rotate} -> idle`.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
    active: Option<ActiveGesture>,
}

fn to_px(v: Vec2, canvas: (u32, u32)) -> Vec2 {
    Vec2::new(
        v.x / 100.0 * f64::from(canvas.0),
        v.y / 100.0 * f64::from(canvas.1),
    )
}

fn pointer_angle_deg(t: &OverlayTransform, pointer: Point, canvas: (u32, u32)) -> f64 {
    let d = to_px(pointer - Point::new(t.x, t.y), canvas);
    d.y.atan2(d.x).to_degrees()
}

impl Interaction {
    /// Idle state machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Overlay targeted by the gesture in progress.
    pub fn target(&self) -> Option<OverlayId> {
        self.active.map(|g| g.overlay)
    }

    /// Start a gesture on `overlay` at `pointer`. Any gesture in progress is replaced.
    pub fn begin(&mut self, kind: GestureKind, overlay: &Overlay, pointer: Point, canvas: (u32, u32)) {
        let start_angle_deg = pointer_angle_deg(&overlay.transform, pointer, canvas);
        self.active = Some(ActiveGesture {
            kind,
            overlay: overlay.id,
            pointer,
            initial: overlay.transform,
            start_angle_deg,
        });
    }

    /// Recompute the overlay transform for the current pointer position.
    pub fn update(
        &mut self,
        overlay: &mut Overlay,
        pointer: Point,
        canvas: (u32, u32),
    ) -> RetouchResult<()> {
        let g = self
            .active
            .ok_or_else(|| RetouchError::validation("no overlay gesture in progress"))?;
        if g.overlay != overlay.id {
            return Err(RetouchError::validation(
                "gesture update targets a different overlay",
            ));
        }
        overlay.transform = match g.kind {
            GestureKind::Move => {
                let d = pointer - g.pointer;
                OverlayTransform {
                    x: g.initial.x + d.x,
                    y: g.initial.y + d.y,
                    ..g.initial
                }
            }
            GestureKind::Resize => {
                resize(&g.initial, pointer - g.pointer, overlay.locked_aspect(), canvas)
            }
            GestureKind::Rotate => {
                let now = pointer_angle_deg(&g.initial, pointer, canvas);
                OverlayTransform {
                    rotation: normalize_degrees(g.initial.rotation + (now - g.start_angle_deg)),
                    ..g.initial
                }
            }
        };
        Ok(())
    }

    /// Finish the gesture in progress, returning its target.
    pub fn end(&mut self) -> RetouchResult<OverlayId> {
        self.active
            .take()
            .map(|g| g.overlay)
            .ok_or_else(|| RetouchError::validation("no overlay gesture in progress"))
    }

    /// Drop any gesture in progress without error.
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

/// Resize about a fixed center. The pointer delta is rotated into the overlay's unrotated frame
/// and the dragged handle follows it, so each dimension changes by twice the local delta.
///
/// `aspect` (`width / height` in pixels) locks the ratio: whichever local delta dominates sets
/// one dimension and the other is derived.
pub fn resize(
    initial: &OverlayTransform,
    delta_pct: Vec2,
    aspect: Option<f64>,
    canvas: (u32, u32),
) -> OverlayTransform {
    let cw = f64::from(canvas.0.max(1));
    let ch = f64::from(canvas.1.max(1));
    let d = to_px(delta_pct, canvas);
    let (sin, cos) = initial.rotation.to_radians().sin_cos();
    let lx = d.x * cos + d.y * sin;
    let ly = -d.x * sin + d.y * cos;

    let w0 = initial.width / 100.0 * cw;
    let h0 = initial.height / 100.0 * ch;
    let min_w = MIN_OVERLAY_SIZE_PCT / 100.0 * cw;
    let min_h = MIN_OVERLAY_SIZE_PCT / 100.0 * ch;

    let (w, h) = match aspect {
        Some(r) if r.is_finite() && r > 0.0 => {
            let mut w = if lx.abs() >= (ly * r).abs() {
                w0 + 2.0 * lx
            } else {
                (h0 + 2.0 * ly) * r
            };
            w = w.max(min_w).max(min_h * r);
            (w, w / r)
        }
        _ => ((w0 + 2.0 * lx).max(min_w), (h0 + 2.0 * ly).max(min_h)),
    };

    OverlayTransform {
        width: w / cw * 100.0,
        height: h / ch * 100.0,
        ..*initial
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/interaction.rs"]
mod tests;
