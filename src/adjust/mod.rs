//! Adjustment records and the raster stages that apply them.

/// HSL-space vibrance and color-mixer processing.
pub mod color;
/// Filter-style raster stages shared by adjustments and light strokes.
pub mod filters;
/// The `Adjustments` record, its domains and the color mixer.
pub mod model;
/// The full adjustment transfer function.
pub mod transfer;
