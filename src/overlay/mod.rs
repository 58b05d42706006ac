//! Text and image overlays positioned in percentage-of-canvas space.

/// Move/resize/rotate gesture handling.
pub mod interaction;
/// Overlay records, templates and the z-ordered stack.
pub mod model;
/// Font registry, wrapping and Parley text layout.
pub mod text;
