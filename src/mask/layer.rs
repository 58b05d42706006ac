use serde::{Deserialize, Serialize};

use crate::adjust::model::Adjustments;
use crate::foundation::error::RetouchResult;
use crate::mask::builder::{AlphaMask, render_strokes};
use crate::mask::gradient::{GradientDescriptor, render_linear, render_radial};
use crate::mask::stroke::{Stroke, StrokeList};

/// Session-unique mask layer identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

/// How a layer's mask is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    /// Painted brush strokes.
    Brush,
    /// Linear gradient.
    LinearGradient,
    /// Radial (elliptical) gradient.
    RadialGradient,
}

/// Geometry owned by a layer. Gradient layers start without a descriptor.
#[derive(Clone, Debug)]
pub enum MaskGeometry {
    /// Committed strokes in paint order.
    Brush(StrokeList<Stroke>),
    /// Linear gradient descriptor.
    Linear(Option<GradientDescriptor>),
    /// Radial gradient descriptor.
    Radial(Option<GradientDescriptor>),
}

impl MaskGeometry {
    /// Empty geometry for `kind`.
    pub fn empty(kind: MaskKind) -> Self {
        match kind {
            MaskKind::Brush => MaskGeometry::Brush(StrokeList::new()),
            MaskKind::LinearGradient => MaskGeometry::Linear(None),
            MaskKind::RadialGradient => MaskGeometry::Radial(None),
        }
    }

    /// The kind this geometry renders as.
    pub fn kind(&self) -> MaskKind {
        match self {
            MaskGeometry::Brush(_) => MaskKind::Brush,
            MaskGeometry::Linear(_) => MaskKind::LinearGradient,
            MaskGeometry::Radial(_) => MaskKind::RadialGradient,
        }
    }
}

/// A masked local-adjustment layer.
#[derive(Clone, Debug)]
pub struct MaskLayer {
    /// Identifier.
    pub id: LayerId,
    /// Display name.
    pub name: String,
    /// Hidden layers are skipped by the compositor.
    pub visible: bool,
    /// Complement the rendered coverage.
    pub invert: bool,
    /// Adjustments applied on top of the global record inside the mask.
    pub adjustments: Adjustments,
    /// Mask geometry.
    pub geometry: MaskGeometry,
}

impl MaskLayer {
    /// A visible, non-inverted layer with neutral adjustments and empty geometry.
    pub fn new(id: LayerId, name: impl Into<String>, kind: MaskKind) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            invert: false,
            adjustments: Adjustments::default(),
            geometry: MaskGeometry::empty(kind),
        }
    }

    /// Mask kind.
    pub fn kind(&self) -> MaskKind {
        self.geometry.kind()
    }

    /// Committed strokes, for brush layers.
    pub fn strokes(&self) -> Option<&StrokeList<Stroke>> {
        match &self.geometry {
            MaskGeometry::Brush(list) => Some(list),
            _ => None,
        }
    }

    /// Coverage before `invert` is applied.
    pub fn render_raw(&self, width: u32, height: u32) -> RetouchResult<AlphaMask> {
        match &self.geometry {
            MaskGeometry::Brush(list) => {
                render_strokes(width, height, list.iter().map(|s| s.as_ref()))
            }
            MaskGeometry::Linear(Some(g)) => render_linear(g, width, height),
            MaskGeometry::Radial(Some(g)) => render_radial(g, width, height),
            MaskGeometry::Linear(None) | MaskGeometry::Radial(None) => {
                AlphaMask::new(width, height)
            }
        }
    }

    /// Final coverage with `invert` applied.
    pub fn render_mask(&self, width: u32, height: u32) -> RetouchResult<AlphaMask> {
        let mut m = self.render_raw(width, height)?;
        if self.invert {
            m.invert();
        }
        Ok(m)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/layer.rs"]
mod tests;
