//! Compositing of mask layers and light strokes over the globally adjusted base.

/// Masked per-channel blending.
pub mod blend;
/// Mask-layer compositor.
pub mod layers;
/// Light-stroke renderer.
pub mod light;
