//! Mask geometry and its rasterization into single-channel coverage.

/// Alpha surfaces and brush painting.
pub mod builder;
/// Linear and radial gradient masks.
pub mod gradient;
/// Masked adjustment layers.
pub mod layer;
/// Strokes, brush settings and generation-counted stroke lists.
pub mod stroke;
