//! Export: flatten transforms and overlays into a final raster, and destructive crop.

/// Rotated bilinear crop.
pub mod crop;
/// Composite, transform and overlay flattening.
pub mod flatten;
