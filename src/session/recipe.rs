//! JSON render recipes: a complete edit described as data, for headless batch rendering.
//!
//! Relative paths (source image, fonts, image overlays) resolve against a caller-supplied base
//! directory, normally the directory holding the recipe file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adjust::model::Adjustments;
use crate::assets::codec::load_image;
use crate::composite::light::LightMode;
use crate::export::crop::CropRect;
use crate::export::flatten::Transforms;
use crate::foundation::core::Point;
use crate::foundation::error::{RetouchError, RetouchResult};
use crate::foundation::opts::EngineOpts;
use crate::mask::gradient::GradientDescriptor;
use crate::mask::layer::MaskKind;
use crate::mask::stroke::BrushParams;
use crate::overlay::model::{OverlayTemplate, OverlayTransform, TextContent};
use crate::session::editor::{EditSession, LightSettings, StrokeTarget};

/// A polyline painted with one brush.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrokeRecipe {
    /// Image-pixel points.
    pub points: Vec<Point>,
    /// Brush; defaults apply when omitted.
    #[serde(default)]
    pub brush: BrushParams,
}

/// A mask layer and its geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerRecipe {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Mask kind.
    pub kind: MaskKind,
    /// Layer adjustments.
    #[serde(default)]
    pub adjustments: Adjustments,
    /// Visibility.
    #[serde(default = "visible")]
    pub visible: bool,
    /// Invert the coverage.
    #[serde(default)]
    pub invert: bool,
    /// Strokes, for brush layers.
    #[serde(default)]
    pub strokes: Vec<StrokeRecipe>,
    /// Descriptor, for gradient layers.
    #[serde(default)]
    pub gradient: Option<GradientDescriptor>,
}

fn visible() -> bool {
    true
}

/// A light stroke.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightRecipe {
    /// Effect.
    pub mode: LightMode,
    /// Strength, `[0, 100]`.
    pub intensity: f32,
    /// Fill color override.
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    /// Image-pixel points.
    pub points: Vec<Point>,
    /// Brush; defaults apply when omitted.
    #[serde(default)]
    pub brush: BrushParams,
}

/// An overlay to place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayRecipe {
    /// Text with an explicit placement.
    Text {
        /// Payload.
        text: TextContent,
        /// Placement; centered default when omitted.
        #[serde(default)]
        transform: OverlayTransform,
    },
    /// An image file; its height follows its aspect ratio.
    Image {
        /// Image path.
        path: PathBuf,
        /// Center x, `%`.
        x: f64,
        /// Center y, `%`.
        y: f64,
        /// Width, `%`.
        width: f64,
    },
    /// A template instantiated at the canvas center.
    Template {
        /// The template.
        template: OverlayTemplate,
    },
}

/// A full edit of one source image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderRecipe {
    /// Source image path.
    pub source: PathBuf,
    /// Destructive crop applied to the source before anything else.
    #[serde(default)]
    pub crop: Option<CropRect>,
    /// Global adjustments.
    #[serde(default)]
    pub adjustments: Adjustments,
    /// Mask layers, bottom first.
    #[serde(default)]
    pub layers: Vec<LayerRecipe>,
    /// Light strokes in commit order.
    #[serde(default)]
    pub light: Vec<LightRecipe>,
    /// Removal mask strokes.
    #[serde(default)]
    pub removal: Vec<StrokeRecipe>,
    /// Font family name to font file.
    #[serde(default)]
    pub fonts: BTreeMap<String, PathBuf>,
    /// Overlays in insertion order.
    #[serde(default)]
    pub overlays: Vec<OverlayRecipe>,
    /// Export transforms.
    #[serde(default)]
    pub transforms: Transforms,
}

fn resolve(base_dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

impl RenderRecipe {
    /// Parse a recipe. Malformed JSON is a validation error.
    pub fn from_json(s: &str) -> RetouchResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| RetouchError::validation(format!("parse render recipe: {e}")))
    }

    /// Load the source and replay every edit into a fresh session.
    #[tracing::instrument(skip(self, opts), fields(source = %self.source.display()))]
    pub fn build(&self, base_dir: &Path, opts: EngineOpts) -> RetouchResult<EditSession> {
        let source = load_image(&resolve(base_dir, &self.source), &opts)?;
        let mut session = EditSession::new(source, opts)?;
        if let Some(rect) = &self.crop {
            session.crop(rect)?;
        }
        session.set_transforms(self.transforms)?;
        session.set_adjustments(self.adjustments)?;

        for l in &self.layers {
            let id = session.add_layer(l.name.clone(), l.kind);
            session.set_layer_adjustments(id, l.adjustments)?;
            session.set_layer_visible(id, l.visible)?;
            session.set_layer_invert(id, l.invert)?;
            if let Some(g) = l.gradient {
                session.set_layer_gradient(id, g)?;
            }
            for s in &l.strokes {
                session.paint_stroke(StrokeTarget::ActiveLayer, s.brush, &s.points)?;
            }
        }
        for l in &self.light {
            let settings = LightSettings {
                mode: l.mode,
                intensity: l.intensity,
                color: l.color,
            };
            session.paint_stroke(StrokeTarget::Light(settings), l.brush, &l.points)?;
        }
        for s in &self.removal {
            session.paint_stroke(StrokeTarget::Removal, s.brush, &s.points)?;
        }

        for (name, path) in &self.fonts {
            let path = resolve(base_dir, path);
            let bytes = std::fs::read(&path).map_err(|e| {
                RetouchError::resource(format!("read font '{}': {e}", path.display()))
            })?;
            session.register_font(name.clone(), bytes)?;
        }
        for o in &self.overlays {
            match o {
                OverlayRecipe::Text { text, transform } => {
                    session.add_text_overlay(text.clone(), *transform)?;
                }
                OverlayRecipe::Image { path, x, y, width } => {
                    let image = load_image(&resolve(base_dir, path), session.opts())?;
                    session.add_image_overlay(image, *x, *y, *width)?;
                }
                OverlayRecipe::Template { template } => {
                    session.instantiate_template(template)?;
                }
            }
        }
        Ok(session)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/recipe.rs"]
mod tests;
