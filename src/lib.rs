//! retouch is a non-destructive photo adjustment and mask-compositing engine.
//!
//! An [`EditSession`] owns one source photo and every edit made to it:
//!
//! - global [`Adjustments`] and any number of masked local-adjustment layers
//! - freehand light strokes and a removal mask for remote edits
//! - positioned text/image overlays and export-time transforms
//!
//! [`EditSession::render`] recomputes only the stages an edit touched and returns the live
//! composite. [`EditSession::export`] flattens the same composite with transforms and overlays.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod foundation;

pub mod adjust;
pub mod assets;
pub mod composite;
pub mod export;
pub mod mask;
pub mod overlay;
pub mod session;

pub use crate::foundation::core::{Affine, Point, Raster, Rect, Vec2};
pub use crate::foundation::error::{RemoteFailure, RetouchError, RetouchResult};
pub use crate::foundation::opts::EngineOpts;

pub use crate::adjust::model::{Adjustments, ColorMixer, HueBand, MixerShift};
pub use crate::composite::light::{LightMode, LightStroke};
pub use crate::export::crop::CropRect;
pub use crate::export::flatten::{ExportOptions, Transforms};
pub use crate::mask::builder::AlphaMask;
pub use crate::mask::gradient::GradientDescriptor;
pub use crate::mask::layer::{LayerId, MaskKind, MaskLayer};
pub use crate::mask::stroke::{BrushParams, Stroke, StrokeId};
pub use crate::overlay::interaction::GestureKind;
pub use crate::overlay::model::{
    Overlay, OverlayContent, OverlayId, OverlayTemplate, OverlayTransform, TextContent,
};
pub use crate::session::cache::RenderStats;
pub use crate::session::editor::{EditSession, LightSettings, StrokeCollection, StrokeTarget};
pub use crate::session::recipe::RenderRecipe;
pub use crate::session::remote::{EditRequest, EditResponse, ImageEditService};
