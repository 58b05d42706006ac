//! Edit sessions: authoritative state, cached rendering, recipes and the remote-edit interface.

/// Generation-keyed surface caches and render statistics.
pub mod cache;
/// The edit session.
pub mod editor;
/// JSON render recipes.
pub mod recipe;
/// Remote generative edit interface.
pub mod remote;
