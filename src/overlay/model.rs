use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Raster;
use crate::foundation::error::{RetouchError, RetouchResult};

/// Smallest overlay width or height, in percent of the canvas.
pub const MIN_OVERLAY_SIZE_PCT: f64 = 1.0;

/// Session-unique overlay identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

/// Placement shared by every overlay kind, in percentage-of-canvas units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayTransform {
    /// Center x, `%` of canvas width.
    pub x: f64,
    /// Center y, `%` of canvas height.
    pub y: f64,
    /// Width, `%` of canvas width.
    pub width: f64,
    /// Height, `%` of canvas height.
    pub height: f64,
    /// Clockwise rotation in degrees, `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity, `[0, 100]`.
    #[serde(default = "full_opacity")]
    pub opacity: f64,
}

fn full_opacity() -> f64 {
    100.0
}

impl Default for OverlayTransform {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            width: 40.0,
            height: 20.0,
            rotation: 0.0,
            opacity: 100.0,
        }
    }
}

impl OverlayTransform {
    /// Reject non-finite fields, sizes below the minimum and opacity outside `[0, 100]`.
    pub fn validate(&self) -> RetouchResult<()> {
        let fields = [
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation,
            self.opacity,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(RetouchError::validation(
                "overlay transform fields must be finite",
            ));
        }
        if self.width < MIN_OVERLAY_SIZE_PCT || self.height < MIN_OVERLAY_SIZE_PCT {
            return Err(RetouchError::validation(format!(
                "overlay width/height must be >= {MIN_OVERLAY_SIZE_PCT}%"
            )));
        }
        if !(0.0..=100.0).contains(&self.opacity) {
            return Err(RetouchError::validation(
                "overlay opacity must be within [0, 100]",
            ));
        }
        Ok(())
    }
}

/// Wrap degrees into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d >= 360.0 { 0.0 } else { d }
}

/// Text overlay payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text; `\n` forces a line break.
    pub content: String,
    /// Registered font family name.
    pub font: String,
    /// Font size in percent of canvas height.
    pub size: f64,
    /// Straight RGBA color.
    #[serde(default = "white")]
    pub color: [u8; 4],
    /// CSS-style weight (400 regular, 700 bold).
    #[serde(default = "regular")]
    pub weight: u16,
    /// Italic style.
    #[serde(default)]
    pub italic: bool,
}

fn white() -> [u8; 4] {
    [255, 255, 255, 255]
}

fn regular() -> u16 {
    400
}

impl TextContent {
    /// Reject a non-positive size or out-of-range weight.
    pub fn validate(&self) -> RetouchResult<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(RetouchError::validation("text size must be > 0"));
        }
        if !(1..=1000).contains(&self.weight) {
            return Err(RetouchError::validation(
                "text weight must be within [1, 1000]",
            ));
        }
        if self.font.trim().is_empty() {
            return Err(RetouchError::validation("text font must be non-empty"));
        }
        Ok(())
    }
}

/// Image overlay payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageContent {
    /// Premultiplied pixels.
    pub source: Arc<Raster>,
    /// Intrinsic `width / height` in pixels.
    pub aspect: f64,
}

impl ImageContent {
    /// Wrap a raster, deriving its aspect ratio.
    pub fn new(source: Raster) -> RetouchResult<Self> {
        source.validate()?;
        let aspect = f64::from(source.width) / f64::from(source.height);
        Ok(Self {
            source: Arc::new(source),
            aspect,
        })
    }
}

/// What an overlay draws.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayContent {
    /// Shaped text.
    Text(TextContent),
    /// A raster image with locked aspect ratio.
    Image(ImageContent),
}

/// A positioned text or image layer drawn above the edited photo.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    /// Identifier.
    pub id: OverlayId,
    /// Placement.
    pub transform: OverlayTransform,
    /// Payload.
    pub content: OverlayContent,
    /// Paint order; higher paints later.
    pub z_index: u64,
    /// Template this overlay was instantiated from.
    pub template_id: Option<String>,
}

impl Overlay {
    /// Intrinsic aspect ratio for aspect-locked content.
    pub fn locked_aspect(&self) -> Option<f64> {
        match &self.content {
            OverlayContent::Image(img) => Some(img.aspect),
            OverlayContent::Text(_) => None,
        }
    }
}

/// Text style preset that instantiates into a text overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayTemplate {
    /// Stable template id, copied into `Overlay::template_id`.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Text payload.
    pub text: TextContent,
    /// Default width, `%`.
    pub width: f64,
    /// Default height, `%`.
    pub height: f64,
}

/// Z-ordered overlay collection.
#[derive(Clone, Debug, Default)]
pub struct OverlayStack {
    overlays: Vec<Overlay>,
    next_id: u64,
    next_z: u64,
    generation: u64,
}

impl OverlayStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(
        &mut self,
        transform: OverlayTransform,
        content: OverlayContent,
        template_id: Option<String>,
    ) -> RetouchResult<OverlayId> {
        transform.validate()?;
        if let OverlayContent::Text(t) = &content {
            t.validate()?;
        }
        self.next_id += 1;
        self.next_z += 1;
        let id = OverlayId(self.next_id);
        self.overlays.push(Overlay {
            id,
            transform: OverlayTransform {
                rotation: normalize_degrees(transform.rotation),
                ..transform
            },
            content,
            z_index: self.next_z,
            template_id,
        });
        self.generation += 1;
        Ok(id)
    }

    /// Add a text overlay on top.
    pub fn add_text(
        &mut self,
        text: TextContent,
        transform: OverlayTransform,
    ) -> RetouchResult<OverlayId> {
        self.insert(transform, OverlayContent::Text(text), None)
    }

    /// Add an image overlay centered at `(x, y)` with `width` percent; the height follows the
    /// image aspect on a canvas of `canvas_aspect` (`width / height`).
    pub fn add_image(
        &mut self,
        image: ImageContent,
        x: f64,
        y: f64,
        width: f64,
        canvas_aspect: f64,
    ) -> RetouchResult<OverlayId> {
        if !canvas_aspect.is_finite() || canvas_aspect <= 0.0 {
            return Err(RetouchError::validation("canvas aspect must be > 0"));
        }
        let height = width * canvas_aspect / image.aspect;
        let transform = OverlayTransform {
            x,
            y,
            width,
            height,
            ..OverlayTransform::default()
        };
        self.insert(transform, OverlayContent::Image(image), None)
    }

    /// Instantiate a template at the canvas center.
    pub fn instantiate_template(&mut self, template: &OverlayTemplate) -> RetouchResult<OverlayId> {
        let transform = OverlayTransform {
            width: template.width,
            height: template.height,
            ..OverlayTransform::default()
        };
        self.insert(
            transform,
            OverlayContent::Text(template.text.clone()),
            Some(template.id.clone()),
        )
    }

    /// Lookup.
    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Mutable lookup. Counts as a change.
    pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut Overlay> {
        let o = self.overlays.iter_mut().find(|o| o.id == id)?;
        self.generation += 1;
        Some(o)
    }

    /// Lookup that reports a validation error for unknown ids.
    pub fn require_mut(&mut self, id: OverlayId) -> RetouchResult<&mut Overlay> {
        self.get_mut(id)
            .ok_or_else(|| RetouchError::validation(format!("unknown overlay {}", id.0)))
    }

    /// Remove an overlay, returning it.
    pub fn remove(&mut self, id: OverlayId) -> RetouchResult<Overlay> {
        let idx = self
            .overlays
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| RetouchError::validation(format!("unknown overlay {}", id.0)))?;
        self.generation += 1;
        Ok(self.overlays.remove(idx))
    }

    /// Remove every overlay. Ids and z-indices keep increasing afterwards.
    pub fn clear(&mut self) {
        if !self.overlays.is_empty() {
            self.overlays.clear();
            self.generation += 1;
        }
    }

    /// Give `id` the highest z-index.
    pub fn bring_to_front(&mut self, id: OverlayId) -> RetouchResult<()> {
        self.next_z += 1;
        let z = self.next_z;
        self.require_mut(id)?.z_index = z;
        Ok(())
    }

    /// Overlays in ascending z-index (paint order).
    pub fn in_paint_order(&self) -> Vec<&Overlay> {
        let mut out: Vec<&Overlay> = self.overlays.iter().collect();
        out.sort_by_key(|o| o.z_index);
        out
    }

    /// Number of overlays.
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Change counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/model.rs"]
mod tests;
