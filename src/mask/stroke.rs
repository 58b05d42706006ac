use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Point;
use crate::foundation::error::{RetouchError, RetouchResult};

/// Session-unique stroke identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrokeId(pub u64);

/// Brush settings captured when a stroke starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrushParams {
    /// Dab radius in image pixels, `> 0`.
    pub radius: f32,
    /// Soft edge as a percentage of the radius, `[0, 100]`.
    pub feather: f32,
    /// Dab opacity, `[0, 100]`.
    pub strength: f32,
    /// Remove coverage instead of adding it.
    #[serde(default)]
    pub erase: bool,
}

impl Default for BrushParams {
    fn default() -> Self {
        Self {
            radius: 20.0,
            feather: 50.0,
            strength: 100.0,
            erase: false,
        }
    }
}

impl BrushParams {
    /// Reject non-finite or out-of-domain settings.
    pub fn validate(&self) -> RetouchResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(RetouchError::validation("brush.radius must be > 0"));
        }
        if !self.feather.is_finite() || !(0.0..=100.0).contains(&self.feather) {
            return Err(RetouchError::validation(
                "brush.feather must be within [0, 100]",
            ));
        }
        if !self.strength.is_finite() || !(0.0..=100.0).contains(&self.strength) {
            return Err(RetouchError::validation(
                "brush.strength must be within [0, 100]",
            ));
        }
        Ok(())
    }

    /// Radius out to which a dab paints at full strength.
    pub fn inner_radius(&self) -> f32 {
        self.radius * (1.0 - (self.feather / 100.0).sqrt())
    }

    /// Distance between consecutive dabs along a path.
    pub fn sample_step(&self) -> f32 {
        (self.radius / 4.0).max(0.25)
    }
}

/// A committed brush stroke: an image-space polyline plus the brush that drew it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Identifier, unique within the session.
    pub id: StrokeId,
    /// Polyline in image pixel coordinates.
    pub points: Vec<Point>,
    /// Brush settings.
    pub brush: BrushParams,
}

impl Stroke {
    /// Validate the brush and that every point is finite and at least one exists.
    pub fn validate(&self) -> RetouchResult<()> {
        self.brush.validate()?;
        if self.points.is_empty() {
            return Err(RetouchError::validation("stroke must have at least one point"));
        }
        if self.points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(RetouchError::validation("stroke points must be finite"));
        }
        Ok(())
    }
}

/// Append-only list of shared immutable records with a generation counter.
///
/// Every mutation bumps the generation; caches compare it to decide whether to rebuild.
#[derive(Debug)]
pub struct StrokeList<T> {
    items: Vec<Arc<T>>,
    generation: u64,
}

impl<T> Default for StrokeList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
        }
    }
}

impl<T> Clone for StrokeList<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            generation: self.generation,
        }
    }
}

impl<T> StrokeList<T> {
    /// Empty list at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return the shared handle.
    pub fn push(&mut self, item: T) -> Arc<T> {
        let item = Arc::new(item);
        self.items.push(Arc::clone(&item));
        self.generation += 1;
        item
    }

    /// Remove the most recently pushed record.
    pub fn pop(&mut self) -> Option<Arc<T>> {
        let out = self.items.pop();
        if out.is_some() {
            self.generation += 1;
        }
        out
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.generation += 1;
        }
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records in commit order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.iter()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&Arc<T>> {
        self.items.last()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/stroke.rs"]
mod tests;
